//! Static furniture catalog.

/// A furniture sprite the user can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogItem {
    /// Stable id stored in placements and on the wire.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Sprite file name, relative to the asset directory.
    pub asset: &'static str,
}

pub const CATALOG: &[CatalogItem] = &[
    CatalogItem { id: "shell1", name: "Shell-1", asset: "item_001.png" },
    CatalogItem { id: "shell2", name: "Shell-2", asset: "item_002.png" },
    CatalogItem { id: "shell3", name: "Shell-3", asset: "item_003.png" },
    CatalogItem { id: "shell4", name: "Shell-4", asset: "item_004.png" },
    CatalogItem { id: "shell5", name: "Shell-5", asset: "item_005.png" },
    CatalogItem { id: "shell6", name: "Shell-6", asset: "item_006.png" },
    CatalogItem { id: "boxes", name: "Boxes", asset: "item_020.png" },
    CatalogItem { id: "shield", name: "Shield", asset: "item_114.png" },
];

/// Look up a catalog item by id.
#[must_use]
pub fn lookup(item_id: &str) -> Option<&'static CatalogItem> {
    CATALOG.iter().find(|item| item.id == item_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_known_items() {
        assert_eq!(lookup("boxes").map(|i| i.asset), Some("item_020.png"));
        assert_eq!(lookup("shell6").map(|i| i.name), Some("Shell-6"));
    }

    #[test]
    fn lookup_unknown_is_none() {
        assert!(lookup("sofa").is_none());
    }

    #[test]
    fn catalog_ids_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
