//! Multipart form reader shared by the item and user handlers
//!
//! Text parts are collected by name; a part named `image` that carries a file
//! name is kept as the uploaded file. An `image` part without a file name is a
//! plain text field (an existing image URL sent back by the dashboard).

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;

use crate::AppError;
use crate::utils::AppResult;

/// Name of the file part
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    image: Option<UploadedFile>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD && field.file_name().is_some() {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                // 浏览器未选文件时也会发送空的 file part
                if !data.is_empty() {
                    form.image = Some(UploadedFile {
                        file_name,
                        data: data.to_vec(),
                    });
                }
                continue;
            }

            let value = field.text().await?;
            form.fields.insert(name, value);
        }

        Ok(form)
    }

    /// Build from plain pairs (tests, JSON fallbacks)
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            image: None,
        }
    }

    /// Trimmed text value; blank counts as absent
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .ok_or_else(|| AppError::validation(format!("{name} is required")))
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> AppResult<Option<T>> {
        match self.text(name) {
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| AppError::validation(format!("{name} has an invalid value '{raw}'"))),
            None => Ok(None),
        }
    }

    pub fn take_image(&mut self) -> Option<UploadedFile> {
        self.image.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_absent() {
        let form = FormData::from_pairs([("name", "  Croissant "), ("description", "   ")]);
        assert_eq!(form.text("name").as_deref(), Some("Croissant"));
        assert_eq!(form.text("description"), None);
        assert!(form.required("description").is_err());
    }

    #[test]
    fn test_parse_numbers() {
        let form = FormData::from_pairs([("price", "3.50"), ("quantity", "lots")]);
        assert_eq!(form.parse::<f64>("price").unwrap(), Some(3.5));
        assert!(form.parse::<i64>("quantity").is_err());
        assert_eq!(form.parse::<i64>("missing").unwrap(), None);
    }
}
