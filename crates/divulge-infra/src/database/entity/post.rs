//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub summary: String,
    pub content_path: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub published_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Author,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post. Content is left empty.
impl From<Model> for divulge_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            account_id: model.account_id,
            author_id: model.author_id,
            title: model.title,
            summary: model.summary,
            content_path: Some(model.content_path),
            content: String::new(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            published_at: model.published_at.map(Into::into),
        }
    }
}

impl ActiveModel {
    /// Build the row for a newly created post. New posts are always drafts.
    pub fn for_insert(
        id: Uuid,
        post: divulge_core::domain::Post,
        content_path: String,
        now: DateTimeWithTimeZone,
    ) -> Self {
        Self {
            id: Set(id),
            account_id: Set(post.account_id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            summary: Set(post.summary),
            content_path: Set(content_path),
            created_at: Set(now),
            updated_at: Set(now),
            published_at: Set(None),
        }
    }
}
