//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::membership::Entity")]
    Membership,
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membership.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain User, attaching the account memberships that
    /// live in their own table.
    pub fn into_domain(self, accounts: Vec<Uuid>) -> divulge_core::domain::User {
        divulge_core::domain::User {
            id: Some(self.id),
            name: self.name,
            email: self.email,
            accounts,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            deleted_at: self.deleted_at.map(Into::into),
        }
    }
}

impl ActiveModel {
    /// Build the row for a newly created user.
    pub fn for_insert(
        id: Uuid,
        user: &divulge_core::domain::User,
        now: DateTimeWithTimeZone,
    ) -> Self {
        Self {
            id: Set(id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
    }
}
