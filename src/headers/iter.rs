use super::{HeaderMap, map::HeaderField};

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = <Iter<'a> as Iterator>::Item;

    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over header name and value pairs, in insertion order.
#[derive(Debug)]
pub struct Iter<'a> {
    iter: std::slice::Iter<'a, HeaderField>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(fields: &'a [HeaderField]) -> Self {
        Self { iter: fields.iter() }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|field| (field.name.as_str(), field.value.as_str()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> { }
