use super::{HeaderError, iter::Iter};
use crate::matches;

const SEPARATOR: &str = ", ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeaderField {
    pub(crate) name: String,
    pub(crate) value: String,
}

/// HTTP Headers.
///
/// Lookups are case-insensitive, names are stored lowercase. Iteration follows the order in
/// which each name first appeared.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    fields: Vec<HeaderField>,
}

impl HeaderMap {
    /// Create new empty [`HeaderMap`].
    ///
    /// This function does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create new empty [`HeaderMap`] with at least the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { fields: Vec::with_capacity(capacity) }
    }

    /// Returns headers length.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if headers has no element.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Removes all headers.
    #[inline]
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Returns an iterator over headers as name and value pair.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.fields)
    }
}

// ===== Lookup =====

impl HeaderMap {
    /// Returns `true` if the map contains a value for given header name.
    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the value corresponding to the given header name.
    ///
    /// ```rust
    /// use wirehttp::headers::HeaderMap;
    ///
    /// let mut map = HeaderMap::new();
    /// map.insert("Content-Type", "text/html").unwrap();
    /// assert_eq!(map.get("content-type"), Some("text/html"));
    /// assert_eq!(map.get("CONTENT-TYPE"), Some("text/html"));
    /// ```
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.fields[i].value.as_str())
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.fields.iter().position(|field| field.name.eq_ignore_ascii_case(name))
    }
}

// ===== Mutation =====

impl HeaderMap {
    /// Insert a header, replacing any existing value.
    ///
    /// Returns the previous value if any.
    pub fn insert(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, HeaderError> {
        let name = normalize_name(name)?;
        let value = validate_value(value.into())?;
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => Ok(Some(std::mem::replace(&mut field.value, value))),
            None => {
                self.fields.push(HeaderField { name, value });
                Ok(None)
            }
        }
    }

    /// Append a header value.
    ///
    /// If the name already exists, the value is joined to the existing one with `", "`.
    pub fn append(&mut self, name: &str, value: impl Into<String>) -> Result<(), HeaderError> {
        let name = normalize_name(name)?;
        let value = validate_value(value.into())?;
        self.append_field(name, &value);
        Ok(())
    }

    /// Removes a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.position(name)?;
        Some(self.fields.remove(index).value)
    }

    /// `name` must already be lowercase and validated.
    pub(crate) fn append_field(&mut self, name: String, value: &str) {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value.reserve(SEPARATOR.len() + value.len());
                field.value.push_str(SEPARATOR);
                field.value.push_str(value);
            }
            None => self.fields.push(HeaderField { name, value: value.to_owned() }),
        }
    }
}

// ===== Parsing =====

impl HeaderMap {
    /// Parse a single header line from `bytes`.
    ///
    /// Returns the number of bytes consumed and whether the header section is complete.
    ///
    /// - If no `\r\n` is found, returns `(0, false)`, more bytes are required.
    /// - If `bytes` starts with `\r\n`, returns `(2, true)`, no field is inserted.
    /// - Otherwise one field is inserted or appended and `(line length + 2, false)` is returned.
    ///
    /// ```rust
    /// use wirehttp::headers::HeaderMap;
    ///
    /// let mut map = HeaderMap::new();
    /// assert_eq!(map.parse(b"Host: localhost:42069\r\n\r\n"), Ok((23, false)));
    /// assert_eq!(map.parse(b"\r\n"), Ok((2, true)));
    /// assert_eq!(map.get("host"), Some("localhost:42069"));
    /// ```
    pub fn parse(&mut self, bytes: &[u8]) -> Result<(usize, bool), HeaderError> {
        let Some(end) = matches::find_crlf(bytes) else {
            return Ok((0, false));
        };

        if end == 0 {
            return Ok((2, true));
        }

        let Ok(line) = std::str::from_utf8(&bytes[..end]) else {
            return Err(HeaderError::InvalidHeader);
        };

        let Some((name, value)) = line.split_once(':') else {
            return Err(HeaderError::InvalidHeader);
        };

        if name.is_empty() || name.ends_with([' ', '\t']) {
            return Err(HeaderError::InvalidFieldName);
        }

        let name = normalize_name(name)?;
        self.append_field(name, value.trim());

        Ok((end + 2, false))
    }
}

fn normalize_name(name: &str) -> Result<String, HeaderError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HeaderError::InvalidFieldName);
    }
    if let Some(byte) = name.bytes().find(|&b| !matches::is_token(b)) {
        return Err(HeaderError::InvalidFieldNameCharacter(byte));
    }
    Ok(name.to_ascii_lowercase())
}

fn validate_value(value: String) -> Result<String, HeaderError> {
    if value.contains(['\r', '\n']) {
        return Err(HeaderError::InvalidFieldValue);
    }
    Ok(value)
}

impl std::fmt::Debug for HeaderMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
