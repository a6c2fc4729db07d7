//! Stamp items: one shape for seals and signatures
//!
//! The backend serves seals and personal signatures as two unrelated
//! entities. Everything downstream of [`StampItem::from_seal`] and
//! [`StampItem::from_signature`] works on [`StampItem`] only.

use crate::geometry::Size;
use crate::image::probe_image_size;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Seal entity as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seal {
    pub id: i64,
    pub seal_name: String,
    #[serde(default)]
    pub seal_type: i32,
    #[serde(default)]
    pub seal_image: String,
    #[serde(default)]
    pub seal_image_url: String,
    #[serde(default)]
    pub owner_id: i64,
    #[serde(default)]
    pub status: i32,
}

/// Personal signature entity as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub signature_name: String,
    #[serde(default)]
    pub signature_image: String,
    #[serde(default)]
    pub signature_image_url: Option<String>,
    #[serde(default)]
    pub signature_type: i32,
    /// Original image width in pixels
    #[serde(default)]
    pub image_width: Option<u32>,
    /// Original image height in pixels
    #[serde(default)]
    pub image_height: Option<u32>,
}

/// Which entity a stamp item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StampKind {
    Seal,
    Signature,
}

/// The thing being placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampItem {
    pub kind: StampKind,
    pub id: i64,
    pub display_name: String,
    pub image_ref: String,
    /// Original pixel dimensions; absent means square
    #[serde(default)]
    pub native_size: Option<Size>,
}

impl StampItem {
    /// Adapt a seal. Seals carry no dimensions and place as squares.
    pub fn from_seal(seal: &Seal) -> Self {
        let image_ref = if seal.seal_image_url.is_empty() {
            seal.seal_image.clone()
        } else {
            seal.seal_image_url.clone()
        };

        Self {
            kind: StampKind::Seal,
            id: seal.id,
            display_name: seal.seal_name.clone(),
            image_ref,
            native_size: None,
        }
    }

    /// Adapt a signature, keeping its native size when the backend sent one
    pub fn from_signature(signature: &Signature) -> Self {
        let image_ref = signature
            .signature_image_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| signature.signature_image.clone());

        let native_size = match (signature.image_width, signature.image_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(Size::new(w as f64, h as f64)),
            _ => None,
        };

        Self {
            kind: StampKind::Signature,
            id: signature.id,
            display_name: signature.signature_name.clone(),
            image_ref,
            native_size,
        }
    }

    /// Attach native dimensions read from the stamp's image bytes
    pub fn with_native_size(mut self, image_data: &[u8]) -> Result<Self> {
        self.native_size = Some(probe_image_size(image_data)?);
        Ok(self)
    }

    /// Width / height of the stamp image, 1.0 when unknown
    pub fn aspect_ratio(&self) -> f64 {
        self.native_size.map(|s| s.aspect_ratio()).unwrap_or(1.0)
    }
}

impl From<&Seal> for StampItem {
    fn from(seal: &Seal) -> Self {
        StampItem::from_seal(seal)
    }
}

impl From<&Signature> for StampItem {
    fn from(signature: &Signature) -> Self {
        StampItem::from_signature(signature)
    }
}

/// Resolve a backend file path against the API base URL
///
/// Absolute URLs and data URIs pass through unchanged.
pub fn resolve_file_url(base_url: &str, path: &str) -> String {
    if path.is_empty()
        || path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("data:")
    {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seal() -> Seal {
        serde_json::from_str(
            r#"{
                "id": 7,
                "sealName": "Company Seal",
                "sealType": 1,
                "sealImage": "/uploads/seal/7.png",
                "sealImageUrl": "",
                "ownerId": 1,
                "status": 1
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_seal_is_square() {
        let item = StampItem::from_seal(&seal());
        assert_eq!(item.kind, StampKind::Seal);
        assert_eq!(item.id, 7);
        assert_eq!(item.image_ref, "/uploads/seal/7.png");
        assert_eq!(item.native_size, None);
        assert_eq!(item.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_from_signature_keeps_native_size() {
        let signature: Signature = serde_json::from_str(
            r#"{
                "id": 3,
                "userId": 9,
                "signatureName": "Zhang San",
                "signatureImage": "/uploads/sig/3.png",
                "signatureImageUrl": "https://cdn.example.com/sig/3.png",
                "signatureType": 2,
                "imageWidth": 200,
                "imageHeight": 100
            }"#,
        )
        .unwrap();

        let item = StampItem::from(&signature);
        assert_eq!(item.kind, StampKind::Signature);
        assert_eq!(item.image_ref, "https://cdn.example.com/sig/3.png");
        assert_eq!(item.native_size, Some(Size::new(200.0, 100.0)));
        assert_eq!(item.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_signature_without_url_or_size() {
        let signature = Signature {
            id: 4,
            user_id: 1,
            signature_name: "Li Si".to_string(),
            signature_image: "/uploads/sig/4.png".to_string(),
            signature_image_url: None,
            signature_type: 1,
            image_width: Some(0),
            image_height: Some(50),
        };

        let item = StampItem::from_signature(&signature);
        assert_eq!(item.image_ref, "/uploads/sig/4.png");
        assert_eq!(item.native_size, None);
    }

    #[test]
    fn test_resolve_file_url() {
        assert_eq!(
            resolve_file_url("http://localhost:8080/", "/uploads/a.png"),
            "http://localhost:8080/uploads/a.png"
        );
        assert_eq!(
            resolve_file_url("http://localhost:8080", "uploads/a.png"),
            "http://localhost:8080/uploads/a.png"
        );
        assert_eq!(
            resolve_file_url("http://localhost:8080", "https://cdn/a.png"),
            "https://cdn/a.png"
        );
        assert_eq!(resolve_file_url("http://localhost:8080", ""), "");
    }
}
