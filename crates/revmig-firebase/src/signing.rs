//! V2 signed read URLs for Cloud Storage objects.
//!
//! V2 signing allows an arbitrary absolute expiry, which the photo links rely
//! on. The signature itself is an RSA-SHA256 over [`string_to_sign`], produced
//! remotely by the IAM `signBlob` call in [`crate::storage`].

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;

/// Characters left unescaped in an object-name path segment.
const OBJECT_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes an object name segment by segment, keeping `/` separators.
#[must_use]
pub fn encode_object_path(object: &str) -> String {
    object
        .split('/')
        .map(|segment| utf8_percent_encode(segment, OBJECT_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonical V2 string for a `GET` with no content type or MD5.
#[must_use]
pub fn string_to_sign(bucket: &str, object: &str, expires_unix: i64) -> String {
    format!(
        "GET\n\n\n{expires_unix}\n/{bucket}/{}",
        encode_object_path(object)
    )
}

/// Assembles the final URL from a base64 `signature`.
///
/// # Errors
///
/// Returns the parse error message if `download_base` plus the object path
/// is not a valid URL.
pub fn signed_url(
    download_base: &Url,
    bucket: &str,
    object: &str,
    access_id: &str,
    expires_unix: i64,
    signature: &str,
) -> Result<Url, String> {
    let raw = format!(
        "{}/{bucket}/{}",
        download_base.as_str().trim_end_matches('/'),
        encode_object_path(object)
    );
    let mut url = Url::parse(&raw).map_err(|e| format!("'{raw}': {e}"))?;
    url.query_pairs_mut()
        .append_pair("GoogleAccessId", access_id)
        .append_pair("Expires", &expires_unix.to_string())
        .append_pair("Signature", signature);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_keeps_slashes_and_escapes_the_rest() {
        assert_eq!(encode_object_path("photos/abc-123"), "photos/abc-123");
        assert_eq!(
            encode_object_path("photos/my photo (1).png"),
            "photos/my%20photo%20%281%29.png"
        );
    }

    #[test]
    fn string_to_sign_layout() {
        assert_eq!(
            string_to_sign("bucket.appspot.com", "photos/id1", 1_742_169_600),
            "GET\n\n\n1742169600\n/bucket.appspot.com/photos/id1"
        );
    }

    #[test]
    fn signed_url_encodes_signature() {
        let base = Url::parse("https://storage.googleapis.com").unwrap();
        let url = signed_url(
            &base,
            "bucket.appspot.com",
            "photos/id1",
            "sa@proj.iam.gserviceaccount.com",
            1_742_169_600,
            "ab+c/d==",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/bucket.appspot.com/photos/id1\
             ?GoogleAccessId=sa%40proj.iam.gserviceaccount.com\
             &Expires=1742169600&Signature=ab%2Bc%2Fd%3D%3D"
        );
    }
}
