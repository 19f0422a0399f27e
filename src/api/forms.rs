//! Binding of the multipart forms used by the movie and actor write
//! endpoints. Fields are gathered first, then parsed by pure functions.

use crate::api::error::AppError;
use crate::models::{ActorCreationDto, MovieCreationDto, MoviesActorsCreationDto};
use crate::services::storage::UploadedFile;
use axum::extract::Multipart;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Default)]
pub struct FormFields {
    text: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormFields {
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.text.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.insert(name.to_string(), file);
        self
    }

    /// Trimmed text value; blank counts as absent.
    fn text(&self, name: &str) -> Option<&str> {
        self.text
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

pub async fn read_form(mut multipart: Multipart) -> Result<FormFields, AppError> {
    let mut fields = FormFields::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        let err_msg = e.to_string();
        if err_msg.contains("length limit exceeded") {
            AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
        } else {
            AppError::BadRequest(err_msg)
        }
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            // Browsers send an empty part when no file was picked
            if !data.is_empty() {
                fields.files.insert(
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        data,
                    },
                );
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            fields.text.insert(name, text);
        }
    }

    Ok(fields)
}

/// Collects per-field parse failures so they are reported together.
struct FieldErrors(ValidationErrors);

impl FieldErrors {
    fn new() -> Self {
        Self(ValidationErrors::new())
    }

    fn add(&mut self, field: &'static str, code: &'static str, message: String) {
        self.0
            .add(field, ValidationError::new(code).with_message(Cow::Owned(message)));
    }

    fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

fn parse_bool(fields: &FormFields, name: &'static str, errors: &mut FieldErrors) -> bool {
    match fields.text(name).map(str::to_lowercase).as_deref() {
        None | Some("false") => false,
        Some("true") | Some("on") => true,
        Some(other) => {
            errors.add(
                name,
                "invalid_bool",
                format!("The value '{}' is not valid for {}", other, name),
            );
            false
        }
    }
}

/// Accepts a plain date or an ISO timestamp, keeping the date part.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| value.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

fn parse_json_list<T: DeserializeOwned>(
    fields: &FormFields,
    name: &'static str,
    errors: &mut FieldErrors,
) -> Vec<T> {
    let Some(raw) = fields.text(name) else {
        return Vec::new();
    };

    match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(e) => {
            errors.add(
                name,
                "invalid_json",
                format!("The value for {} is not a valid JSON list: {}", name, e),
            );
            Vec::new()
        }
    }
}

fn check_image(file: &UploadedFile, name: &'static str, errors: &mut FieldErrors) {
    if let Err(e) = file.extension() {
        errors.add(name, "invalid_image", e.to_string());
    }
}

pub fn movie_from_form(mut fields: FormFields) -> Result<MovieCreationDto, AppError> {
    let mut errors = FieldErrors::new();

    let in_theaters = parse_bool(&fields, "inTheaters", &mut errors);

    let release_date = match fields.text("releaseDate") {
        Some(value) => parse_date(value).unwrap_or_else(|| {
            errors.add(
                "releaseDate",
                "invalid_date",
                format!("The value '{}' is not a valid date", value),
            );
            NaiveDate::MIN
        }),
        None => {
            errors.add(
                "releaseDate",
                "required",
                "The field ReleaseDate is required".to_string(),
            );
            NaiveDate::MIN
        }
    };

    let genres_ids: Vec<i32> = parse_json_list(&fields, "genresIds", &mut errors);
    let movie_theaters_ids: Vec<i32> = parse_json_list(&fields, "movieTheatersIds", &mut errors);
    let actors: Vec<MoviesActorsCreationDto> = parse_json_list(&fields, "actors", &mut errors);

    let poster = fields.take_file("poster");
    if let Some(file) = &poster {
        check_image(file, "poster", &mut errors);
    }

    errors.into_result()?;

    let dto = MovieCreationDto {
        title: fields.text("title").unwrap_or_default().to_string(),
        summary: fields.text("summary").map(str::to_string),
        in_theaters,
        trailer: fields.text("trailer").map(str::to_string),
        release_date,
        poster,
        genres_ids,
        movie_theaters_ids,
        actors,
    };
    dto.validate()?;

    Ok(dto)
}

pub fn actor_from_form(mut fields: FormFields) -> Result<ActorCreationDto, AppError> {
    let mut errors = FieldErrors::new();

    let date_of_birth = fields.text("dateOfBirth").and_then(|value| {
        let parsed = parse_date(value);
        if parsed.is_none() {
            errors.add(
                "dateOfBirth",
                "invalid_date",
                format!("The value '{}' is not a valid date", value),
            );
        }
        parsed
    });

    let picture = fields.take_file("picture");
    if let Some(file) = &picture {
        check_image(file, "picture", &mut errors);
    }

    errors.into_result()?;

    let dto = ActorCreationDto {
        name: fields.text("name").unwrap_or_default().to_string(),
        date_of_birth,
        biography: fields.text("biography").map(str::to_string),
        picture,
    };
    dto.validate()?;

    Ok(dto)
}
