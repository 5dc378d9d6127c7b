use derive_more::{AsRef, Display};

use crate::{CreateError, DeleteError, Name, ReadError, SyncError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait CategoryService {
    async fn get_categories(&self) -> Result<Vec<Category>, ReadError>;
    async fn create_category(&self, name: &str, color: &str) -> Result<Category, CreateError>;
    async fn replace_category(&self, category: Category) -> Result<Category, UpdateError>;
    /// Refuses to delete a category that is still referenced by any exercise.
    async fn delete_category(&self, id: CategoryID) -> Result<CategoryID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait CategoryRepository {
    async fn sync_categories(&self) -> Result<Vec<Category>, SyncError>;
    async fn read_categories(&self) -> Result<Vec<Category>, ReadError>;
    async fn create_category(&self, category: Category) -> Result<Category, CreateError>;
    async fn replace_category(&self, category: Category) -> Result<Category, UpdateError>;
    async fn count_exercises_in_category(&self, id: CategoryID) -> Result<usize, ReadError>;
    async fn delete_category(&self, id: CategoryID) -> Result<CategoryID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryID,
    pub name: Name,
    pub color: Color,
}

id!(CategoryID);

/// Opaque style token used to display a category.
#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq)]
pub struct Color(String);

impl Color {
    pub const PLACEHOLDER: &'static str = "bg-gray-500";

    #[must_use]
    pub fn new(color: &str) -> Self {
        let color = color.trim();
        if color.is_empty() {
            Self::default()
        } else {
            Self(color.to_string())
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(Self::PLACEHOLDER.to_string())
    }
}

impl From<Option<String>> for Color {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Color::new).unwrap_or_default()
    }
}
