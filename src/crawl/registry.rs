// src/crawl/registry.rs
// =============================================================================
// The page registry: one entry per normalized URL the crawl has claimed.
//
// Entry lifecycle:
//
//   (absent) --reserve--> Reserved --finalize--> Populated(record)
//                                  \-finalize--> Stub(empty record)
//
// Each step happens at most once per key. A key that isn't in the map was
// never claimed. The registry itself does no locking; CrawlContext keeps it
// behind the crawl's one Mutex together with the budget and the task set.
// =============================================================================

use std::collections::{BTreeMap, HashMap};

use crate::extract::PageRecord;

/// State of a claimed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEntry {
    /// Claimed by a task that hasn't finished with it yet
    Reserved { url: String },
    /// Fetched and extracted
    Populated(PageRecord),
    /// Claimed but never produced data (failed fetch or cancelled task)
    Stub(PageRecord),
}

impl PageEntry {
    pub fn record(&self) -> Option<&PageRecord> {
        match self {
            PageEntry::Reserved { .. } => None,
            PageEntry::Populated(record) | PageEntry::Stub(record) => Some(record),
        }
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, PageEntry::Stub(_))
    }
}

/// How a reserved entry ends.
#[derive(Debug)]
pub enum Finalization {
    Populated(PageRecord),
    Stub,
}

#[derive(Debug, Default)]
pub struct PageRegistry {
    entries: HashMap<String, PageEntry>,
}

impl PageRegistry {
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&PageEntry> {
        self.entries.get(key)
    }

    // Marks a key as claimed
    //
    // Returns false (and changes nothing) if the key already has an entry.
    pub fn reserve(&mut self, key: &str, url: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(
            key.to_string(),
            PageEntry::Reserved {
                url: url.to_string(),
            },
        );
        true
    }

    // Moves a Reserved entry to its final state
    //
    // Returns: true if the entry changed. Absent, Populated and Stub entries
    //          are left alone, so finalizing twice is harmless.
    pub fn finalize(&mut self, key: &str, outcome: Finalization) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        let PageEntry::Reserved { url } = &mut *entry else {
            return false;
        };

        *entry = match outcome {
            Finalization::Populated(record) => PageEntry::Populated(record),
            Finalization::Stub => PageEntry::Stub(PageRecord::stub(std::mem::take(url))),
        };
        true
    }

    // Freezes the registry once every task has finished
    //
    // Any entry still Reserved is turned into a stub so the report never sees
    // a half-claimed page. Returns the entries ordered by key plus how many
    // had to be rescued that way (zero in a correct crawl).
    pub fn settle(self) -> (BTreeMap<String, PageEntry>, usize) {
        let mut dangling = 0;
        let settled = self
            .entries
            .into_iter()
            .map(|(key, entry)| match entry {
                PageEntry::Reserved { url } => {
                    dangling += 1;
                    (key, PageEntry::Stub(PageRecord::stub(url)))
                }
                other => (key, other),
            })
            .collect();

        (settled, dangling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            heading: "Title".to_string(),
            ..PageRecord::default()
        }
    }

    #[test]
    fn test_reserve_once() {
        let mut registry = PageRegistry::default();
        assert!(registry.reserve("example.com", "https://example.com"));
        assert!(!registry.reserve("example.com", "http://example.com/"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("example.com"),
            Some(&PageEntry::Reserved {
                url: "https://example.com".to_string()
            })
        );
    }

    #[test]
    fn test_finalize_populated() {
        let mut registry = PageRegistry::default();
        registry.reserve("example.com", "https://example.com");
        let page = record("https://example.com");

        assert!(registry.finalize("example.com", Finalization::Populated(page.clone())));
        assert_eq!(registry.get("example.com"), Some(&PageEntry::Populated(page)));
    }

    #[test]
    fn test_finalize_stub_keeps_url() {
        let mut registry = PageRegistry::default();
        registry.reserve("example.com/x", "https://example.com/x");

        assert!(registry.finalize("example.com/x", Finalization::Stub));
        let entry = registry.get("example.com/x").unwrap();
        assert!(entry.is_stub());
        assert_eq!(entry.record().unwrap().url, "https://example.com/x");
        assert!(entry.record().unwrap().is_empty());
    }

    #[test]
    fn test_finalize_is_one_shot() {
        let mut registry = PageRegistry::default();
        registry.reserve("example.com", "https://example.com");
        registry.finalize(
            "example.com",
            Finalization::Populated(record("https://example.com")),
        );

        // A late stub must not wipe out real data
        assert!(!registry.finalize("example.com", Finalization::Stub));
        assert!(!registry.get("example.com").unwrap().is_stub());
    }

    #[test]
    fn test_finalize_absent_key_is_noop() {
        let mut registry = PageRegistry::default();
        assert!(!registry.finalize("nowhere.com", Finalization::Stub));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_settle_rescues_dangling_reservations() {
        let mut registry = PageRegistry::default();
        registry.reserve("b.com", "https://b.com");
        registry.reserve("a.com", "https://a.com");
        registry.finalize("a.com", Finalization::Populated(record("https://a.com")));

        let (entries, dangling) = registry.settle();
        assert_eq!(dangling, 1);
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["a.com", "b.com"]);
        assert!(entries["b.com"].is_stub());
    }
}
