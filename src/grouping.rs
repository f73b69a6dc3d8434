/// Grouping of flat history records by registrable domain or by calendar date
use crate::domain::{extract_hostname, registrable_domain};
use crate::history_data::HistoryRecord;
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Bucket for records whose hostname cannot be extracted
pub const OTHER_BUCKET: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    #[default]
    Domain,
    Date,
}

impl GroupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupMode::Domain => "domain",
            GroupMode::Date => "date",
        }
    }

    pub fn parse(value: &str) -> Option<GroupMode> {
        match value {
            "domain" => Some(GroupMode::Domain),
            "date" => Some(GroupMode::Date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Count,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Count => "count",
        }
    }

    pub fn parse(value: &str) -> Option<SortKey> {
        match value {
            "name" => Some(SortKey::Name),
            "count" => Some(SortKey::Count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn parse(value: &str) -> Option<SortDirection> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Ordering applied to domain-mode groups, subdomains and leaves
///
/// `Count` puts the largest count first when ascending; `Desc` reverses
/// whichever base order the key defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOptions {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOptions {
    pub fn new(key: SortKey, direction: SortDirection) -> SortOptions {
        SortOptions { key, direction }
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    fn compare(&self, name_a: &str, count_a: usize, name_b: &str, count_b: usize) -> Ordering {
        let base = match self.key {
            SortKey::Name => compare_names(name_a, name_b),
            SortKey::Count => count_b.cmp(&count_a),
        };
        self.directed(base)
    }

    pub fn compare_groups(&self, a: &DomainGroup, b: &DomainGroup) -> Ordering {
        self.compare(&a.root_domain, a.total_count, &b.root_domain, b.total_count)
    }

    pub fn compare_subdomains(&self, a: (&str, usize), b: (&str, usize)) -> Ordering {
        self.compare(a.0, a.1, b.0, b.1)
    }

    pub fn compare_records(&self, a: &HistoryRecord, b: &HistoryRecord) -> Ordering {
        self.compare(
            a.display_title(),
            a.visit_count as usize,
            b.display_title(),
            b.visit_count as usize,
        )
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Records sharing one registrable domain, split by full hostname
#[derive(Debug, Clone, PartialEq)]
pub struct DomainGroup {
    pub root_domain: String,
    pub subdomains: BTreeMap<String, Vec<HistoryRecord>>,
    pub total_count: usize,
}

impl DomainGroup {
    pub fn new(root_domain: &str) -> DomainGroup {
        DomainGroup {
            root_domain: root_domain.to_string(),
            subdomains: BTreeMap::new(),
            total_count: 0,
        }
    }

    fn push(&mut self, hostname: &str, record: &HistoryRecord) {
        self.subdomains
            .entry(hostname.to_string())
            .or_default()
            .push(record.clone());
        self.total_count += 1;
    }

    /// Subdomains with their records, both in display order
    pub fn sorted_subdomains(&self, sort: &SortOptions) -> Vec<(&str, Vec<&HistoryRecord>)> {
        let mut entries: Vec<(&str, &Vec<HistoryRecord>)> = self
            .subdomains
            .iter()
            .map(|(host, records)| (host.as_str(), records))
            .collect();

        entries.sort_by(|a, b| sort.compare_subdomains((a.0, a.1.len()), (b.0, b.1.len())));

        entries
            .into_iter()
            .map(|(host, records)| (host, sort_records(records, sort)))
            .collect()
    }
}

/// Result of domain-mode grouping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DomainGroups {
    pub groups: BTreeMap<String, DomainGroup>,
    /// Records whose hostname could not be extracted
    pub other: Option<DomainGroup>,
}

impl DomainGroups {
    /// Groups in display order; the "other" group always comes last
    pub fn sorted(&self, sort: &SortOptions) -> Vec<&DomainGroup> {
        let mut groups: Vec<&DomainGroup> = self.groups.values().collect();
        groups.sort_by(|a, b| sort.compare_groups(a, b));
        groups.extend(self.other.iter());
        groups
    }

    pub fn total_count(&self) -> usize {
        self.groups.values().map(|g| g.total_count).sum::<usize>()
            + self.other.as_ref().map_or(0, |g| g.total_count)
    }
}

/// Sort leaf records for display
pub fn sort_records<'a>(records: &'a [HistoryRecord], sort: &SortOptions) -> Vec<&'a HistoryRecord> {
    let mut sorted: Vec<&HistoryRecord> = records.iter().collect();
    sorted.sort_by(|a, b| sort.compare_records(a, b));
    sorted
}

/// Group records by registrable domain, then by full hostname
///
/// Internal pages (`chrome://settings`) are their own root domain. Records
/// with no extractable hostname land in the "other" group. Never fails.
pub fn group_by_domain(records: &[HistoryRecord]) -> DomainGroups {
    let mut groups: BTreeMap<String, DomainGroup> = BTreeMap::new();
    let mut other = DomainGroup::new(OTHER_BUCKET);

    for record in records {
        let Some(hostname) = extract_hostname(&record.url) else {
            other.push(OTHER_BUCKET, record);
            continue;
        };

        let root_domain = if hostname.contains("://") {
            hostname.clone()
        } else {
            registrable_domain(&hostname)
        };

        groups
            .entry(root_domain.clone())
            .or_insert_with(|| DomainGroup::new(&root_domain))
            .push(&hostname, record);
    }

    log::debug!(
        "Grouped {} records into {} domains ({} unparsed)",
        records.len(),
        groups.len(),
        other.total_count
    );

    DomainGroups {
        groups,
        other: (other.total_count > 0).then_some(other),
    }
}

/// Records of one day keyed by hostname; `None` holds records without one
pub type DayGroups = BTreeMap<Option<String>, Vec<HistoryRecord>>;

/// Result of date-mode grouping: year -> month -> day -> hostname
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateGroups {
    pub years: BTreeMap<i32, BTreeMap<u32, BTreeMap<u32, DayGroups>>>,
}

impl DateGroups {
    pub fn total_count(&self) -> usize {
        self.years
            .values()
            .flat_map(|months| months.values())
            .flat_map(|days| days.values())
            .flat_map(|hosts| hosts.values())
            .map(Vec::len)
            .sum()
    }
}

/// Hostnames of one day in display order, records without a hostname last
pub fn sorted_day_hosts(day: &DayGroups) -> Vec<(Option<&str>, &Vec<HistoryRecord>)> {
    let mut hosts: Vec<(&str, &Vec<HistoryRecord>)> = day
        .iter()
        .filter_map(|(host, records)| host.as_deref().map(|host| (host, records)))
        .collect();
    hosts.sort_by(|a, b| compare_names(a.0, b.0));

    hosts
        .into_iter()
        .map(|(host, records)| (Some(host), records))
        .chain(day.get(&None).map(|records| (None, records)))
        .collect()
}

/// Leaf order within a date-mode hostname: latest visit first
pub fn most_recent_first(records: &[HistoryRecord]) -> Vec<&HistoryRecord> {
    let mut sorted: Vec<&HistoryRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.last_visit_time.total_cmp(&a.last_visit_time));
    sorted
}

/// Group records by local calendar date
pub fn group_by_date(records: &[HistoryRecord]) -> DateGroups {
    group_by_date_in(records, &Local)
}

/// Group records by calendar date in the given time zone
pub fn group_by_date_in<Tz: TimeZone>(records: &[HistoryRecord], tz: &Tz) -> DateGroups {
    let mut grouped = DateGroups::default();

    for record in records {
        let (year, month, day) = calendar_date(record.last_visit_time, tz);
        let hostname = extract_hostname(&record.url);

        grouped
            .years
            .entry(year)
            .or_default()
            .entry(month)
            .or_default()
            .entry(day)
            .or_default()
            .entry(hostname)
            .or_default()
            .push(record.clone());
    }

    log::debug!("Grouped {} records into {} years", records.len(), grouped.years.len());

    grouped
}

/// Calendar date of a millisecond timestamp; unrepresentable values map to the epoch
fn calendar_date<Tz: TimeZone>(millis: f64, tz: &Tz) -> (i32, u32, u32) {
    let utc = if millis.is_finite() {
        DateTime::<Utc>::from_timestamp_millis(millis.floor() as i64)
    } else {
        None
    };

    let local = utc.unwrap_or_default().with_timezone(tz);
    (local.year(), local.month(), local.day())
}

/// Grouping output for either mode
#[derive(Debug, Clone, PartialEq)]
pub enum GroupedHistory {
    Domain(DomainGroups),
    Date(DateGroups),
}

impl GroupedHistory {
    pub fn mode(&self) -> GroupMode {
        match self {
            GroupedHistory::Domain(_) => GroupMode::Domain,
            GroupedHistory::Date(_) => GroupMode::Date,
        }
    }

    pub fn total_count(&self) -> usize {
        match self {
            GroupedHistory::Domain(groups) => groups.total_count(),
            GroupedHistory::Date(groups) => groups.total_count(),
        }
    }
}

pub fn group_records(records: &[HistoryRecord], mode: GroupMode) -> GroupedHistory {
    match mode {
        GroupMode::Domain => GroupedHistory::Domain(group_by_domain(records)),
        GroupMode::Date => GroupedHistory::Date(group_by_date(records)),
    }
}
