//! Keyset cursor for picture galleries
//!
//! Pictures are totally ordered by the 5-tuple
//! `(category_sort_order, sub_category_sort_order, sub_item_sort_order, inspection_id, picture_id)`.
//! A cursor is the tuple of the last record a client has seen; the next page is every record
//! strictly greater than it. The cursor's own row does not need to exist any more.
//!
//! Two wire forms exist: the structured [`PictureCursor`] object and an opaque, HMAC-signed
//! token produced by [`CursorCodec`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use utoipa::ToSchema;

use crate::constants::MAX_CURSOR_TOKEN_LENGTH;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed-width ordered sort key. Field order defines the lexicographic order used by
/// the derived `Ord` and must match the SQL row comparison in the picture repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PictureSortKey {
    pub category_sort_order: i32,
    pub sub_category_sort_order: i32,
    pub sub_item_sort_order: i32,
    pub inspection_id: i64,
    pub picture_id: i64,
}

impl PictureSortKey {
    fn validate(self) -> Result<Self, AppError> {
        if self.category_sort_order < 0
            || self.sub_category_sort_order < 0
            || self.sub_item_sort_order < 0
        {
            return Err(AppError::InvalidCursorFormat(
                "sort orders must not be negative".to_string(),
            ));
        }
        if self.inspection_id <= 0 || self.picture_id <= 0 {
            return Err(AppError::InvalidCursorFormat(
                "owner and picture ids must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Structured cursor as exchanged in JSON bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PictureCursor {
    pub last_category_sort_order: i32,
    pub last_sub_category_sort_order: i32,
    pub last_sub_item_sort_order: i32,
    pub last_owner_id: i64,
    pub last_picture_id: i64,
}

impl From<PictureSortKey> for PictureCursor {
    fn from(key: PictureSortKey) -> Self {
        Self {
            last_category_sort_order: key.category_sort_order,
            last_sub_category_sort_order: key.sub_category_sort_order,
            last_sub_item_sort_order: key.sub_item_sort_order,
            last_owner_id: key.inspection_id,
            last_picture_id: key.picture_id,
        }
    }
}

impl TryFrom<PictureCursor> for PictureSortKey {
    type Error = AppError;

    fn try_from(cursor: PictureCursor) -> Result<Self, Self::Error> {
        PictureSortKey {
            category_sort_order: cursor.last_category_sort_order,
            sub_category_sort_order: cursor.last_sub_category_sort_order,
            sub_item_sort_order: cursor.last_sub_item_sort_order,
            inspection_id: cursor.last_owner_id,
            picture_id: cursor.last_picture_id,
        }
        .validate()
    }
}

/// Encodes sort keys into signed opaque tokens and back.
///
/// Token layout: `base64url(payload) "." hex(hmac_sha256(base64url(payload)))` where the
/// payload is the five tuple fields joined with `.`. Decoding fails closed on any defect.
#[derive(Clone)]
pub struct CursorCodec {
    mac: HmacSha256,
}

impl std::fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorCodec").finish_non_exhaustive()
    }
}

impl CursorCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, AppError> {
        let mac = HmacSha256::new_from_slice(secret.as_ref())
            .map_err(|e| AppError::Internal(format!("Invalid cursor secret: {}", e)))?;
        Ok(Self { mac })
    }

    pub fn encode(&self, key: &PictureSortKey) -> String {
        let payload = format!(
            "{}.{}.{}.{}.{}",
            key.category_sort_order,
            key.sub_category_sort_order,
            key.sub_item_sort_order,
            key.inspection_id,
            key.picture_id
        );
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());

        let mut mac = self.mac.clone();
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        format!("{}.{}", body, signature)
    }

    pub fn decode(&self, token: &str) -> Result<PictureSortKey, AppError> {
        let invalid = |reason: &str| AppError::InvalidCursorFormat(reason.to_string());

        if token.is_empty() || token.len() > MAX_CURSOR_TOKEN_LENGTH {
            return Err(invalid("cursor token has an invalid length"));
        }

        let (body, signature) = token
            .split_once('.')
            .ok_or_else(|| invalid("cursor token is malformed"))?;
        let signature = hex::decode(signature).map_err(|_| invalid("cursor token is malformed"))?;

        let mut mac = self.mac.clone();
        mac.update(body.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| invalid("cursor token signature mismatch"))?;

        let payload = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| invalid("cursor token is malformed"))?;
        let payload = String::from_utf8(payload).map_err(|_| invalid("cursor token is malformed"))?;

        let parts: Vec<&str> = payload.split('.').collect();
        if parts.len() != 5 {
            return Err(invalid("cursor token must carry five fields"));
        }

        let small = |s: &str| s.parse::<i32>().map_err(|_| invalid("cursor field is not a number"));
        let large = |s: &str| s.parse::<i64>().map_err(|_| invalid("cursor field is not a number"));

        PictureSortKey {
            category_sort_order: small(parts[0])?,
            sub_category_sort_order: small(parts[1])?,
            sub_item_sort_order: small(parts[2])?,
            inspection_id: large(parts[3])?,
            picture_id: large(parts[4])?,
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: i32, s: i32, i: i32, o: i64, p: i64) -> PictureSortKey {
        PictureSortKey {
            category_sort_order: c,
            sub_category_sort_order: s,
            sub_item_sort_order: i,
            inspection_id: o,
            picture_id: p,
        }
    }

    #[test]
    fn ordering_is_lexicographic_with_picture_id_tiebreak() {
        assert!(key(1, 9, 9, 9, 9) < key(2, 0, 0, 1, 1));
        assert!(key(1, 1, 1, 1, 101) < key(1, 1, 1, 1, 102));
        assert!(key(1, 1, 2, 1, 1) > key(1, 1, 1, 5, 500));
        assert!(key(1, 1, 1, 2, 1) > key(1, 1, 1, 1, 999));
    }

    #[test]
    fn token_decodes_to_the_encoded_key() {
        let codec = CursorCodec::new("secret").unwrap();
        let original = key(3, 1, 7, 42, 1005);
        let token = codec.encode(&original);
        assert_eq!(codec.decode(&token).unwrap(), original);
    }

    #[test]
    fn tampered_token_fails_closed() {
        let codec = CursorCodec::new("secret").unwrap();
        let token = codec.encode(&key(1, 1, 1, 1, 102));
        let forged_body = URL_SAFE_NO_PAD.encode(b"1.1.1.1.1");
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", forged_body, signature);

        assert!(matches!(
            codec.decode(&forged),
            Err(AppError::InvalidCursorFormat(_))
        ));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = CursorCodec::new("one").unwrap().encode(&key(1, 1, 1, 1, 1));
        assert!(CursorCodec::new("two").unwrap().decode(&token).is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let codec = CursorCodec::new("secret").unwrap();
        let oversized = "a".repeat(600);
        for token in ["", "abc", "abc.zz", "....", oversized.as_str()] {
            assert!(
                matches!(codec.decode(token), Err(AppError::InvalidCursorFormat(_))),
                "token {:?} should be rejected",
                token
            );
        }
    }

    #[test]
    fn structured_cursor_rejects_negative_fields() {
        let cursor = PictureCursor {
            last_category_sort_order: -1,
            last_sub_category_sort_order: 0,
            last_sub_item_sort_order: 0,
            last_owner_id: 1,
            last_picture_id: 1,
        };
        assert!(PictureSortKey::try_from(cursor).is_err());
    }

    #[test]
    fn structured_cursor_uses_camel_case_wire_names() {
        let cursor = PictureCursor::from(key(1, 2, 3, 4, 5));
        let json = serde_json::to_value(cursor).unwrap();
        assert_eq!(json["lastCategorySortOrder"], 1);
        assert_eq!(json["lastOwnerId"], 4);
        assert_eq!(json["lastPictureId"], 5);
    }
}
