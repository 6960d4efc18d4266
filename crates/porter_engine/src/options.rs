/// Photo formats the target accepts; anything else is dropped.
pub const DEFAULT_PHOTO_FORMATS: &[&str] = &["png", "jpg", "jpeg", "gif"];

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Zone name recorded on every entry. Not validated.
    pub time_zone: String,
    /// Lowercase extensions without the dot.
    pub photo_formats: Vec<String>,
    /// Archive folder that receives the renamed photos.
    pub media_dir: String,
}

impl ConvertOptions {
    pub fn with_time_zone(time_zone: impl Into<String>) -> Self {
        Self {
            time_zone: time_zone.into(),
            ..Self::default()
        }
    }

    pub fn allows_format(&self, format: &str) -> bool {
        !format.is_empty() && self.photo_formats.iter().any(|allowed| allowed == format)
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            time_zone: "UTC".to_string(),
            photo_formats: DEFAULT_PHOTO_FORMATS.iter().map(|f| f.to_string()).collect(),
            media_dir: "photos".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub journal_filename: String,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            journal_filename: "Journal.json".to_string(),
        }
    }
}
