use anyhow::{Result, anyhow};
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

pub const FIRST_LETTER_UPPERCASE_MESSAGE: &str = "The first letter should be uppercase";

/// Image types accepted for posters and actor pictures, with the extension
/// used for the stored file name.
const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
];

/// Rejects values whose first character changes when uppercased.
/// Empty values pass; presence is checked separately.
pub fn first_letter_uppercase(value: &str) -> Result<(), ValidationError> {
    let Some(first) = value.chars().next() else {
        return Ok(());
    };

    if first.to_uppercase().ne(std::iter::once(first)) {
        return Err(ValidationError::new("first_letter_uppercase")
            .with_message(Cow::Borrowed(FIRST_LETTER_UPPERCASE_MESSAGE)));
    }

    Ok(())
}

/// Flattens validator output into `field -> [messages]`, falling back to the
/// error code when a rule has no message.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Checks magic bytes to verify an upload is an image and picks the
/// extension for its stored name. The claimed content type must agree when
/// one is given.
pub fn image_extension(data: &[u8], claimed: Option<&str>) -> Result<&'static str> {
    if data.is_empty() {
        return Err(anyhow!("File appears to be empty"));
    }

    let detected = infer::get(data)
        .map(|kind| kind.mime_type())
        .ok_or_else(|| anyhow!("Unrecognized file type"))?;

    let extension = IMAGE_EXTENSIONS
        .iter()
        .find(|(mime_type, _)| *mime_type == detected)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| anyhow!("File type '{}' is not an accepted image", detected))?;

    if let Some(claimed) = claimed {
        let parsed: mime::Mime = claimed
            .parse()
            .map_err(|_| anyhow!("Invalid content type '{}'", claimed))?;
        if parsed.type_() != mime::IMAGE && parsed != mime::APPLICATION_OCTET_STREAM {
            tracing::warn!(
                "Content type mismatch: claimed {}, detected {}",
                claimed,
                detected
            );
            return Err(anyhow!("Content type '{}' is not an image", claimed));
        }
    }

    Ok(extension)
}
