use crate::{
    CategoryID, CreateError, DeleteError, Name, ReadError, StorageError, SyncError, UpdateError,
    ValidationError,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError>;
    async fn create_exercise(
        &self,
        input: ExerciseInput,
        image: Option<Image>,
    ) -> Result<Exercise, CreateError>;
    async fn replace_exercise(
        &self,
        id: ExerciseID,
        input: ExerciseInput,
        image: Option<Image>,
    ) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn sync_exercises(&self) -> Result<Vec<Exercise>, SyncError>;
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(&self, exercise: Exercise) -> Result<Exercise, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

/// Object storage for exercise images.
#[allow(async_fn_in_trait)]
pub trait ImageRepository {
    async fn upload_image(&self, image: Image) -> Result<StoredImage, StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub description: String,
    pub category: Option<CategoryID>,
    pub image_url: Option<String>,
}

id!(ExerciseID);

/// Unvalidated exercise fields as entered by the user.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExerciseInput {
    pub name: String,
    pub description: String,
    pub category: Option<CategoryID>,
    pub image_url: Option<String>,
}

impl ExerciseInput {
    /// Name and category are required.
    pub fn validate(self, id: ExerciseID) -> Result<Exercise, ValidationError> {
        let name = Name::new(&self.name)?;
        let Some(category) = self.category else {
            return Err(ValidationError::MissingCategory);
        };
        Ok(Exercise {
            id,
            name,
            description: self.description.trim().to_string(),
            category: Some(category),
            image_url: self.image_url.filter(|url| !url.is_empty()),
        })
    }
}

impl From<&Exercise> for ExerciseInput {
    fn from(value: &Exercise) -> Self {
        Self {
            name: value.name.to_string(),
            description: value.description.clone(),
            category: value.category,
            image_url: value.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Image {
    #[must_use]
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => extension,
            _ => match self.content_type.as_str() {
                "image/png" => "png",
                "image/webp" => "webp",
                "image/gif" => "gif",
                _ => "jpg",
            },
        }
    }
}

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub path: String,
    pub url: String,
}
