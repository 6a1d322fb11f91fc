use crate::model::CommitSeries;
use crate::util::aggregate_path;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

pub const DEFAULT_TOP: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnEntry {
    pub path: String,
    pub commits: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub authors: u64,
}

#[derive(Default)]
struct ChurnAccum {
    commits: u64,
    lines_added: u64,
    lines_removed: u64,
    authors: BTreeSet<String>,
}

/// Files (or directories when `depth` is set) ranked by the number of
/// commits touching them, ties broken by path. At most `top` entries.
pub fn churn_ranking(series: &CommitSeries, top: usize, depth: Option<u32>) -> Vec<ChurnEntry> {
    let mut map: HashMap<String, ChurnAccum> = HashMap::new();

    for commit in series {
        let mut touched: BTreeSet<String> = BTreeSet::new();
        for file in &commit.files {
            let key = match depth {
                Some(d) => aggregate_path(&file.path, d),
                None => file.path.clone(),
            };
            let entry = map.entry(key.clone()).or_default();
            entry.lines_added += file.lines_added as u64;
            entry.lines_removed += file.lines_removed as u64;
            touched.insert(key);
        }
        for key in touched {
            if let Some(entry) = map.get_mut(&key) {
                entry.commits += 1;
                entry.authors.insert(commit.author.clone());
            }
        }
    }

    let mut entries: Vec<ChurnEntry> = map
        .into_iter()
        .map(|(path, acc)| ChurnEntry {
            path,
            commits: acc.commits,
            lines_added: acc.lines_added,
            lines_removed: acc.lines_removed,
            authors: acc.authors.len() as u64,
        })
        .collect();

    entries.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.path.cmp(&b.path)));
    entries.truncate(top);
    entries
}
