use std::fmt;

/// Kind of page, derived from the URL shape only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Page enumerating several postings with links to their detail pages
    Listing,

    /// Page describing one posting
    Detail,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Detail => "detail",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(PageKind::Listing.to_string(), "listing");
        assert_eq!(PageKind::Detail.to_string(), "detail");
    }
}
