use rand::Rng;

const BOUNDARY_PREFIX: &str = "---------------------------";

/// Builds a `multipart/form-data` body in memory
#[derive(Debug, Clone)]
pub struct Multipart {
    boundary: String,
    bytes: Vec<u8>,
}

/// A finished multipart body and the boundary that delimits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    pub boundary: String,
    pub bytes: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        let boundary = format!("{}{:016x}", BOUNDARY_PREFIX, rand::thread_rng().gen::<u64>());
        Self::with_boundary(boundary)
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            bytes: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.push_line(&format!(
            "Content-Disposition: form-data; name=\"{}\"",
            escape(name)
        ));
        self.push_line("");
        self.bytes.extend_from_slice(value.as_bytes());
        self.push_line("");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, mime: &str, data: &[u8]) -> Self {
        self.open_part();
        self.push_line(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
            escape(name),
            escape(filename)
        ));
        self.push_line(&format!("Content-Type: {}", mime));
        self.push_line("");
        self.bytes.extend_from_slice(data);
        self.push_line("");
        self
    }

    pub fn finish(mut self) -> MultipartBody {
        let closing = format!("--{}--", self.boundary);
        self.push_line(&closing);

        MultipartBody {
            boundary: self.boundary,
            bytes: self.bytes,
        }
    }

    fn open_part(&mut self) {
        let delimiter = format!("--{}", self.boundary);
        self.push_line(&delimiter);
    }

    fn push_line(&mut self, line: &str) {
        self.bytes.extend_from_slice(line.as_bytes());
        self.bytes.extend_from_slice(b"\r\n");
    }
}

/// Keeps a value inside its quoted `Content-Disposition` parameter
fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn content_length(&self) -> usize {
        self.bytes.len()
    }
}
