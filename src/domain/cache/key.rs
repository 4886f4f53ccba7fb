//! Cache key namespaces and glob patterns

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::domain::DomainError;

/// Suffix of the aggregate "everything in this domain" entry
pub const ALL_SUFFIX: &str = "all";

/// Suffix of the category hierarchy entry
pub const TREE_SUFFIX: &str = "tree";

/// Key namespace; the prefix fully determines how keys are invalidated in bulk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    Products,
    Categories,
    CarBrands,
    CarModels,
    ProductBrands,
    User,
    Cart,
    Sync,
}

impl CacheNamespace {
    /// Returns the key prefix, including the trailing separator
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Products => "products:",
            Self::Categories => "categories:",
            Self::CarBrands => "car_brands:",
            Self::CarModels => "car_models:",
            Self::ProductBrands => "product_brands:",
            Self::User => "user:",
            Self::Cart => "cart:",
            Self::Sync => "sync:",
        }
    }

    /// Builds a key inside this namespace
    pub fn key(&self, suffix: impl fmt::Display) -> String {
        format!("{}{}", self.prefix(), suffix)
    }

    /// Glob pattern matching every key in this namespace
    pub fn pattern(&self) -> String {
        format!("{}*", self.prefix())
    }
}

/// Key of the incremental-sync watermark for a table
pub fn sync_timestamp_key(table: &str) -> String {
    CacheNamespace::Sync.key(format_args!("timestamp:{}", table))
}

/// Catalog domains that carry a full-listing aggregate under `{prefix}all`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogDomain {
    Products,
    Categories,
    CarBrands,
    CarModels,
    ProductBrands,
}

impl CatalogDomain {
    pub const ALL: [CatalogDomain; 5] = [
        Self::Products,
        Self::Categories,
        Self::CarBrands,
        Self::CarModels,
        Self::ProductBrands,
    ];

    pub fn namespace(&self) -> CacheNamespace {
        match self {
            Self::Products => CacheNamespace::Products,
            Self::Categories => CacheNamespace::Categories,
            Self::CarBrands => CacheNamespace::CarBrands,
            Self::CarModels => CacheNamespace::CarModels,
            Self::ProductBrands => CacheNamespace::ProductBrands,
        }
    }

    /// Key of the full listing for this domain
    pub fn all_key(&self) -> String {
        self.namespace().key(ALL_SUFFIX)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::CarBrands => "car_brands",
            Self::CarModels => "car_models",
            Self::ProductBrands => "product_brands",
        }
    }
}

impl fmt::Display for CatalogDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "products" => Ok(Self::Products),
            "categories" => Ok(Self::Categories),
            "car_brands" => Ok(Self::CarBrands),
            "car_models" => Ok(Self::CarModels),
            "product_brands" => Ok(Self::ProductBrands),
            _ => Err(DomainError::validation(format!(
                "Unknown catalog domain: {}. Valid domains: products, categories, car_brands, car_models, product_brands",
                s
            ))),
        }
    }
}

/// Compiles a Redis-style glob (`*`, `?`, `[...]`, `\` escapes) into an anchored regex
pub fn glob_to_regex(pattern: &str) -> Result<Regex, DomainError> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars();
    let mut in_class = false;
    let mut buf = [0u8; 4];

    out.push('^');

    while let Some(c) = chars.next() {
        if in_class {
            match c {
                ']' => {
                    in_class = false;
                    out.push(']');
                }
                '-' | '^' => out.push(c),
                '\\' => {
                    if let Some(next) = chars.next() {
                        out.push_str(&regex::escape(next.encode_utf8(&mut buf)));
                    }
                }
                other => out.push_str(&regex::escape(other.encode_utf8(&mut buf))),
            }
            continue;
        }

        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                in_class = true;
                out.push('[');
            }
            '\\' => match chars.next() {
                Some(next) => out.push_str(&regex::escape(next.encode_utf8(&mut buf))),
                None => out.push_str("\\\\"),
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }

    out.push('$');

    Regex::new(&out)
        .map_err(|e| DomainError::validation(format!("Invalid pattern '{}': {}", pattern, e)))
}
