//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use gazette_core::domain;

/// Stored editorial category.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Category {
    #[sea_orm(string_value = "Scientific")]
    Scientific,
    #[sea_orm(string_value = "IT")]
    It,
}

impl From<Category> for domain::Category {
    fn from(category: Category) -> Self {
        match category {
            Category::Scientific => domain::Category::Scientific,
            Category::It => domain::Category::It,
        }
    }
}

impl From<domain::Category> for Category {
    fn from(category: domain::Category) -> Self {
        match category {
            domain::Category::Scientific => Category::Scientific,
            domain::Category::It => Category::It,
        }
    }
}

/// Stored moderation status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PostStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<PostStatus> for domain::ModerationStatus {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Pending => domain::ModerationStatus::Pending,
            PostStatus::Approved => domain::ModerationStatus::Approved,
            PostStatus::Rejected => domain::ModerationStatus::Rejected,
        }
    }
}

impl From<domain::ModerationStatus> for PostStatus {
    fn from(status: domain::ModerationStatus) -> Self {
        match status {
            domain::ModerationStatus::Pending => PostStatus::Pending,
            domain::ModerationStatus::Approved => PostStatus::Approved,
            domain::ModerationStatus::Rejected => PostStatus::Rejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub category: Category,
    /// Tag list stored as a JSON array of strings.
    pub tags: Json,
    pub image: String,
    pub status: PostStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            content: model.content,
            category: model.category.into(),
            tags: serde_json::from_value(model.tags).unwrap_or_default(),
            image: model.image,
            status: model.status.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<domain::Post> for ActiveModel {
    fn from(post: domain::Post) -> Self {
        Self {
            id: Set(post.id),
            owner_id: Set(post.owner_id),
            title: Set(post.title),
            content: Set(post.content),
            category: Set(post.category.into()),
            tags: Set(serde_json::to_value(&post.tags).unwrap_or_default()),
            image: Set(post.image),
            status: Set(post.status.into()),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
