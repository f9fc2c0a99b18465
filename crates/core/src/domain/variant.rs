// Typed Semantic Keys and Variant Tables
//
// Keys are enums per facet (id / class / text / structure) with a stable
// token string. Typo-prone stringly keys never cross the engine boundary;
// the token only appears where table data is loaded or emitted.

use std::collections::HashMap;
use std::marker::PhantomData;

/// A semantic key with a stable data token.
pub trait VariantKey: Copy + 'static {
    const ALL: &'static [Self];

    fn token(self) -> &'static str;

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.token() == token)
    }
}

macro_rules! variant_key {
    ($name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl VariantKey for $name {
            const ALL: &'static [$name] = &[$($name::$variant),+];

            fn token(self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }
        }
    };
}

// Element id slots
variant_key!(IdKey {
    SearchInput => "search-input",
    SearchButton => "search-button",
    ResultsList => "results-list",
    DetailPanel => "detail-panel",
    FilterForm => "filter-form",
    PaginationNav => "pagination-nav",
    PrimaryNav => "primary-nav",
    AccountMenu => "account-menu",
});

// CSS class slots
variant_key!(ClassKey {
    Card => "card",
    CardTitle => "card-title",
    CardMeta => "card-meta",
    ListRow => "list-row",
    Badge => "badge",
    PriceTag => "price-tag",
    NavLink => "nav-link",
    SectionHeading => "section-heading",
    SubmitButton => "submit-button",
    EmptyState => "empty-state",
});

// User-visible text slots
variant_key!(TextKey {
    SearchPlaceholder => "search-placeholder",
    ApplyCta => "apply-cta",
    BookCta => "book-cta",
    AddToCartCta => "add-to-cart-cta",
    ViewDetailsCta => "view-details-cta",
    EmptyResults => "empty-results",
    LoadingLabel => "loading-label",
    ContactCta => "contact-cta",
});

// Components eligible for decoy wrapping
variant_key!(ComponentKey {
    JobCard => "job-card",
    DoctorCard => "doctor-card",
    ProductCard => "product-card",
    TripCard => "trip-card",
    SearchPanel => "search-panel",
    ResultsSection => "results-section",
    DetailHeader => "detail-header",
    FilterSidebar => "filter-sidebar",
});

// Reorderable lists
variant_key!(ListKey {
    JobResults => "job-results",
    DoctorResults => "doctor-results",
    ProductGrid => "product-grid",
    TripResults => "trip-results",
    NavItems => "nav-items",
    FilterOptions => "filter-options",
});

/// Immutable token -> ordered candidate list, typed by facet.
///
/// Tables are loaded once from static data and never computed at runtime.
pub struct VariantTable<K: VariantKey> {
    entries: HashMap<&'static str, Vec<String>>,
    _facet: PhantomData<K>,
}

impl<K: VariantKey> VariantTable<K> {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            _facet: PhantomData,
        }
    }

    /// Build a table from raw (token, candidates) entries.
    ///
    /// Unknown tokens are returned to the caller instead of silently
    /// dropped, so loaders can log them.
    pub fn from_entries<I>(entries: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut table = Self::empty();
        let mut unknown = Vec::new();
        for (token, candidates) in entries {
            match K::from_token(&token) {
                Some(key) => {
                    table.entries.insert(key.token(), candidates);
                }
                None => unknown.push(token),
            }
        }
        (table, unknown)
    }

    pub fn candidates(&self, key: K) -> Option<&[String]> {
        self.entries.get(key.token()).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
