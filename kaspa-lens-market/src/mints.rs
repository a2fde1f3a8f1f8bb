use kaspa_lens_base::{Listing, NewMintsCollection, RecentMint, Ticker};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WatchedCollection {
    #[serde(flatten)]
    pub collection: NewMintsCollection,
    pub watched: bool,
}

// 新铸造检测，每个 (tick, id) 只通知一次
#[derive(Debug, Default)]
pub struct MintWatcher {
    watched: HashSet<Ticker>,
    seen: HashSet<(Ticker, u64)>,
    primed: bool,
}

impl MintWatcher {
    pub fn new(watched: impl IntoIterator<Item = impl Into<Ticker>>) -> Self {
        MintWatcher {
            watched: watched.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn is_watched(&self, tick: &Ticker) -> bool {
        self.watched.contains(tick)
    }

    pub fn set_watched(&mut self, watched: impl IntoIterator<Item = impl Into<Ticker>>) {
        self.watched = watched.into_iter().map(Into::into).collect();
    }

    /// 记录一次轮询结果，返回关注集合中首次出现的铸造。
    /// 第一次轮询只建立基线，不返回任何铸造。
    pub fn observe(&mut self, mints: &[RecentMint]) -> Vec<RecentMint> {
        let mut fresh = Vec::new();

        for mint in mints {
            let inserted = self.seen.insert((mint.tick.clone(), mint.id));

            if inserted && self.primed && self.is_watched(&mint.tick) {
                fresh.push(mint.clone());
            }
        }

        if !self.primed {
            self.primed = true;
            tracing::debug!(seen = self.seen.len(), "mint watcher primed");
        }

        fresh
    }

    // 关注的排在前面，其余按 tick 排序
    pub fn collections(
        &self,
        collections: Vec<NewMintsCollection>,
        search: Option<&str>,
    ) -> Vec<WatchedCollection> {
        let listing = Listing::new()
            .filter(|c: &WatchedCollection| {
                search.map_or(true, |needle| c.collection.tick.matches(needle))
            })
            .sort_by(|a: &WatchedCollection, b: &WatchedCollection| {
                b.watched
                    .cmp(&a.watched)
                    .then_with(|| a.collection.tick.cmp(&b.collection.tick))
            })
            .page(1, collections.len().max(1));

        let rows = collections.into_iter().map(|collection| WatchedCollection {
            watched: self.is_watched(&collection.tick),
            collection,
        });

        listing.apply(rows).items
    }
}
