use assetdex_catalog::{FileRow, Package};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Label used in license summaries for packages without license data.
pub const UNKNOWN_LICENSE: &str = "Unknown";

/// Whether the identifier sweep ran to the end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    Complete,
    /// Stopped at a batch boundary; identifiers after that point were never
    /// looked up and appear in no bucket.
    Cancelled,
}

/// Outcome for one identifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution<'a> {
    /// Exactly one owning package. Several files of that package may carry
    /// the identifier.
    Resolved(&'a [FileRow]),
    /// More than one package owns the identifier.
    Ambiguous(&'a [FileRow]),
    Unidentified,
}

/// Result of a usage sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsageReport {
    pub completion: Completion,
    /// Distinct identifiers submitted.
    pub total_identifiers: usize,
    pub resolved: BTreeMap<String, Vec<FileRow>>,
    pub ambiguous: BTreeMap<String, Vec<FileRow>>,
    pub unidentified: BTreeSet<String>,
    /// Placeholders for installed registry packages missing from the catalog.
    pub virtual_packages: Vec<Package>,
}

/// Aggregate figures over the distinct used packages.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UsageSummary {
    pub resolved: usize,
    pub ambiguous: usize,
    pub unidentified: usize,
    pub unidentified_ratio: f64,
    pub package_count: usize,
    pub priced_packages: usize,
    pub total_price: f64,
    /// License name -> number of used packages.
    pub licenses: BTreeMap<String, usize>,
}

impl UsageReport {
    pub(crate) fn new(total_identifiers: usize) -> Self {
        Self {
            completion: Completion::Complete,
            total_identifiers,
            resolved: BTreeMap::new(),
            ambiguous: BTreeMap::new(),
            unidentified: BTreeSet::new(),
            virtual_packages: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Complete
    }

    /// Identifiers that ended up in one of the three buckets.
    pub fn processed(&self) -> usize {
        self.resolved.len() + self.ambiguous.len() + self.unidentified.len()
    }

    pub fn resolution(&self, identifier: &str) -> Option<Resolution<'_>> {
        if let Some(rows) = self.resolved.get(identifier) {
            Some(Resolution::Resolved(rows))
        } else if let Some(rows) = self.ambiguous.get(identifier) {
            Some(Resolution::Ambiguous(rows))
        } else if self.unidentified.contains(identifier) {
            Some(Resolution::Unidentified)
        } else {
            None
        }
    }

    /// Share of processed identifiers no package claimed, 0.0 when nothing
    /// was processed.
    pub fn unidentified_ratio(&self) -> f64 {
        let processed = self.processed();
        if processed == 0 {
            0.0
        } else {
            self.unidentified.len() as f64 / processed as f64
        }
    }

    /// Distinct packages owning at least one resolved identifier, plus the
    /// virtual placeholders, ordered by name.
    pub fn used_packages(&self) -> Vec<&Package> {
        let mut by_id: BTreeMap<i64, &Package> = BTreeMap::new();
        for rows in self.resolved.values() {
            for row in rows {
                by_id.entry(row.package.id).or_insert(&row.package);
            }
        }
        for package in &self.virtual_packages {
            by_id.entry(package.id).or_insert(package);
        }
        let mut packages: Vec<&Package> = by_id.into_values().collect();
        packages.sort_by_cached_key(|p| (p.display_name.to_lowercase(), p.id));
        packages
    }

    pub fn used_package_ids(&self) -> BTreeSet<i64> {
        self.used_packages().iter().map(|p| p.id).collect()
    }

    pub fn summary(&self) -> UsageSummary {
        let used = self.used_packages();
        let mut licenses: BTreeMap<String, usize> = BTreeMap::new();
        for package in &used {
            let license = package
                .license
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .unwrap_or(UNKNOWN_LICENSE);
            *licenses.entry(license.to_string()).or_default() += 1;
        }
        let prices: Vec<f64> = used.iter().filter_map(|p| p.price).collect();

        UsageSummary {
            resolved: self.resolved.len(),
            ambiguous: self.ambiguous.len(),
            unidentified: self.unidentified.len(),
            unidentified_ratio: self.unidentified_ratio(),
            package_count: used.len(),
            priced_packages: prices.len(),
            total_price: prices.iter().sum(),
            licenses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdex_catalog::{FileEntry, SourceKind};
    use pretty_assertions::assert_eq;

    fn row(package: &Package, path: &str, guid: &str) -> FileRow {
        FileRow {
            file: FileEntry::new(package.id, path).with_guid(guid),
            package: package.clone(),
        }
    }

    #[test]
    fn summary_counts_distinct_packages() {
        let mut kit = Package::new(1, "Kit", SourceKind::StorePackage);
        kit.price = Some(10.0);
        kit.license = Some("Standard".to_string());
        let mut tools = Package::new(2, "Tools", SourceKind::StorePackage);
        tools.price = Some(5.5);
        let other = Package::new(3, "Other", SourceKind::StorePackage);

        let mut report = UsageReport::new(5);
        report.resolved.insert("g1".into(), vec![row(&kit, "a.png", "g1")]);
        report.resolved.insert("g2".into(), vec![row(&kit, "b.png", "g2")]);
        report.resolved.insert("g3".into(), vec![row(&tools, "c.png", "g3")]);
        report.ambiguous.insert(
            "g4".into(),
            vec![row(&kit, "d.png", "g4"), row(&other, "d.png", "g4")],
        );
        report.unidentified.insert("g5".into());
        report
            .virtual_packages
            .push(Package::new(-1, "com.example.physics", SourceKind::RegistryPackage));

        let summary = report.summary();
        assert_eq!(summary.package_count, 3);
        assert_eq!(summary.priced_packages, 2);
        assert_eq!(summary.total_price, 15.5);
        assert_eq!(summary.unidentified_ratio, 0.2);
        assert_eq!(
            summary.licenses,
            BTreeMap::from([("Standard".to_string(), 1), (UNKNOWN_LICENSE.to_string(), 2)])
        );
        assert_eq!(report.used_package_ids(), BTreeSet::from([-1, 1, 2]));
        assert_eq!(report.processed(), 5);
        assert!(matches!(
            report.resolution("g4"),
            Some(Resolution::Ambiguous(rows)) if rows.len() == 2
        ));
        assert_eq!(report.resolution("missing"), None);
    }

    #[test]
    fn empty_report_ratio_is_zero() {
        assert_eq!(UsageReport::new(0).unidentified_ratio(), 0.0);
    }
}
