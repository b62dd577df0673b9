use std::path::Path;

use rand::Rng;

const USER_IDENTIFIER_ALPHABET: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz=-_.";
const USER_IDENTIFIER_LEN: usize = 64;

pub fn get_content_type(file_path: &str) -> &'static str {
    let path = Path::new(file_path);
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("tiff") | Some("tif") => "image/tiff",
        Some("bmp") => "image/bmp",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// A random identifier for Basic auth users that did not bring their own.
pub fn generate_user_identifier() -> String {
    let mut rng = rand::thread_rng();
    (0..USER_IDENTIFIER_LEN)
        .map(|_| USER_IDENTIFIER_ALPHABET[rng.gen_range(0..USER_IDENTIFIER_ALPHABET.len())] as char)
        .collect()
}
