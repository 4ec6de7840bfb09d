//! Checks applied to files picked in a file field, before any upload

use super::hydrate_attrs::FileAttrs;
use super::types::{FieldKind, FieldDescriptor, FileType, ServerFile, UploadFile};

pub const INVALID_FILE_TYPE: &str = "Type de fichier invalide";
pub const INVALID_FILE_SIZE: &str = "Fichier trop volumineux";
pub const INVALID_FILE_LIMIT: &str = "Nombre maximum de fichiers atteint";

impl FileType {
    /// Same matching as the `accept` attribute: `type/*` on the mime type,
    /// `.ext` on the file name
    pub fn matches(&self, mime_type: &str, file_name: &str) -> bool {
        let mime_type = mime_type.to_ascii_lowercase();
        let file_name = file_name.to_ascii_lowercase();
        self.accept().split(',').any(|token| {
            if let Some(family) = token.strip_suffix("/*") {
                mime_type.starts_with(&format!("{}/", family))
            } else {
                file_name.ends_with(token)
            }
        })
    }
}

impl FileAttrs {
    /// Files the field may hold at once
    pub fn max_files(&self) -> usize {
        match (self.allow_multiple.unwrap_or(false), self.file_limit) {
            (false, _) => 1,
            (true, Some(limit)) => limit,
            (true, None) => usize::MAX,
        }
    }

    /// `already` counts the files the field holds before this one
    pub fn check_upload(&self, already: usize, file: &UploadFile) -> Result<(), String> {
        if !self.accepted_file_types.matches(&file.mime_type, &file.name) {
            return Err(self
                .invalid_file_type_message
                .clone()
                .unwrap_or_else(|| INVALID_FILE_TYPE.to_string()));
        }
        if let Some(max) = self.max_file_size {
            if file.bytes.len() as u64 > max {
                return Err(self
                    .invalid_file_size_message
                    .clone()
                    .unwrap_or_else(|| INVALID_FILE_SIZE.to_string()));
            }
        }
        if already >= self.max_files() {
            return Err(self
                .invalid_file_limit_message
                .clone()
                .unwrap_or_else(|| INVALID_FILE_LIMIT.to_string()));
        }
        Ok(())
    }

    /// Thumbnail of a stored file; videos and documents use the placeholders
    pub fn preview_url<'a>(&'a self, file: &'a ServerFile) -> &'a str {
        match self.accepted_file_types {
            FileType::Image if !file.preview_url.is_empty() => &file.preview_url,
            FileType::Image => &file.original_url,
            FileType::Video => &self.video_preview_img_url,
            FileType::Doc => &self.doc_preview_img_url,
        }
    }
}

impl FieldDescriptor {
    /// Stored, uploaded and pending files of a file field
    pub fn file_count(&self) -> usize {
        match &self.kind {
            FieldKind::File(f) => {
                f.read_files.as_ref().map_or(0, Vec::len) + f.value.len() + f.pending.len()
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_form::hydrate_attrs::{hydrate_attrs, ExtraAttrs};
    use crate::dynamic_form::types::FileField;

    fn file_attrs(field: FileField) -> FileAttrs {
        let item = FieldDescriptor::new("photo", "Photo", FieldKind::File(field));
        match hydrate_attrs("f", &item, None).extra {
            ExtraAttrs::File(attrs) => attrs,
            other => panic!("unexpected attrs {:?}", other),
        }
    }

    fn upload(name: &str, mime: &str, size: usize) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            mime_type: mime.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn test_file_type_matches() {
        assert!(FileType::Image.matches("image/png", "a.png"));
        assert!(!FileType::Image.matches("video/mp4", "a.mp4"));
        assert!(FileType::Video.matches("video/mp4", "a.mp4"));
        assert!(FileType::Doc.matches("application/pdf", "Facture.PDF"));
        assert!(!FileType::Doc.matches("application/zip", "a.zip"));
    }

    #[test]
    fn test_check_upload_messages() {
        let attrs = file_attrs(FileField {
            max_file_size: Some(10),
            invalid_file_size_message: Some("Max 10 octets".to_string()),
            ..FileField::default()
        });
        assert_eq!(attrs.check_upload(0, &upload("a.txt", "text/plain", 1)), Err(INVALID_FILE_TYPE.to_string()));
        assert_eq!(attrs.check_upload(0, &upload("a.png", "image/png", 11)), Err("Max 10 octets".to_string()));
        assert!(attrs.check_upload(0, &upload("a.png", "image/png", 10)).is_ok());
        assert_eq!(attrs.check_upload(1, &upload("b.png", "image/png", 1)), Err(INVALID_FILE_LIMIT.to_string()));
    }

    #[test]
    fn test_max_files() {
        assert_eq!(file_attrs(FileField::default()).max_files(), 1);
        let multiple = file_attrs(FileField {
            allow_multiple: Some(true),
            file_limit: Some(3),
            ..FileField::default()
        });
        assert_eq!(multiple.max_files(), 3);
        assert!(multiple.check_upload(2, &upload("c.jpg", "image/jpeg", 1)).is_ok());
    }

    #[test]
    fn test_preview_url() {
        let file = ServerFile {
            original_url: "/storage/1/a.mp4".to_string(),
            ..ServerFile::default()
        };
        let video = file_attrs(FileField {
            file_type: FileType::Video,
            ..FileField::default()
        });
        assert_eq!(video.preview_url(&file), "/images/Video.jpg");
        let image = file_attrs(FileField::default());
        assert_eq!(image.preview_url(&file), "/storage/1/a.mp4");
    }
}
