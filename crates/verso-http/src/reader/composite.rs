use super::{ApiVersionReader, RawApiVersions};
use http::request::Parts;

/// Unions the values of several readers, in reader order.
#[derive(Debug, Default)]
pub struct CompositeApiVersionReader {
    readers: Vec<Box<dyn ApiVersionReader>>,
}

impl CompositeApiVersionReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reader.
    pub fn with<R: ApiVersionReader + 'static>(mut self, reader: R) -> Self {
        self.readers.push(Box::new(reader));
        self
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl ApiVersionReader for CompositeApiVersionReader {
    fn read(&self, request: &Parts) -> RawApiVersions {
        let mut versions = RawApiVersions::new();
        for reader in &self.readers {
            versions.extend(reader.read(request));
        }
        versions
    }
}

/// Combine readers into one. The same version sent through two channels is
/// reported once; different versions are all reported.
pub fn combine(readers: impl IntoIterator<Item = Box<dyn ApiVersionReader>>) -> CompositeApiVersionReader {
    CompositeApiVersionReader {
        readers: readers.into_iter().collect(),
    }
}
