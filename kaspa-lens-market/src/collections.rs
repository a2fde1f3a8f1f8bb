use itertools::Itertools;
use kaspa_lens_base::{Listing, MintedToken, NftCollection, NftMarket, Page, Ticker};
use kaspa_lens_client::krc721::Krc721Deployment;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use strum_macros::{Display, EnumString};

pub const TOP_COLLECTIONS: usize = 20;
pub const TOKEN_GRID_PAGE_SIZE: usize = 100;
// 没有总量信息时按 500 个展示
pub const FALLBACK_SUPPLY: u64 = 500;

#[derive(Deserialize, Display, EnumString, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CollectionTab {
    #[default]
    Trending,
    Top,
    Recent,
    Floor,
}

impl CollectionTab {
    pub fn listing<'a>(&self, search: Option<&'a str>) -> Listing<'a, NftCollection> {
        let tab = *self;

        Listing::new()
            .filter(move |c: &NftCollection| {
                search.map_or(true, |needle| c.tick.matches(needle))
                    && (tab != CollectionTab::Trending || c.volume_24h > 0.0)
            })
            .sort_by(move |a: &NftCollection, b: &NftCollection| match tab {
                CollectionTab::Trending | CollectionTab::Recent => b.volume_24h.total_cmp(&a.volume_24h),
                CollectionTab::Top => b.total_volume.total_cmp(&a.total_volume),
                CollectionTab::Floor => b.floor_price.total_cmp(&a.floor_price),
            })
            .page(1, TOP_COLLECTIONS)
    }
}

/// 以市场数据为主表，合并部署信息；KAS 本身不是集合
pub fn join_collections(
    markets: &HashMap<String, NftMarket>,
    deployments: Vec<Krc721Deployment>,
    thumbnail_url: impl Fn(&str) -> String,
) -> Vec<NftCollection> {
    let mut deployments: HashMap<String, Krc721Deployment> = deployments
        .into_iter()
        .map(|d| (d.tick.clone(), d))
        .collect();

    markets
        .iter()
        .filter(|(tick, _)| !Ticker::new(tick.as_str()).is_kas())
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(tick, market)| {
            let deployment = deployments.remove(tick).unwrap_or_default();

            let minted_percentage = match (deployment.minted, deployment.max) {
                (Some(minted), Some(max)) if minted > 0 && max > 0 => {
                    Some(minted as f64 / max as f64 * 100.0)
                }
                _ => None,
            };

            NftCollection {
                tick: Ticker::new(tick.as_str()),
                floor_price: market.floor_price,
                total_volume: market.total_volume,
                volume_24h: market.volume_24h,
                change_24h: market.change_24h,
                total_supply: deployment.max.filter(|max| *max > 0),
                minted_count: deployment.minted.filter(|minted| *minted > 0),
                minted_percentage,
                thumbnail_url: thumbnail_url(tick),
                deployer: deployment.deployer,
                buri: deployment.buri,
                royalty_fee: deployment.royalty_fee,
                premint: deployment.premint.unwrap_or(0),
            }
        })
        .collect()
}

// 集合内全部 token，标记已铸造
pub struct TokenGrid {
    total_supply: u64,
    minted: HashSet<u64>,
}

impl TokenGrid {
    pub fn new(total_supply: Option<u64>, minted_ids: impl IntoIterator<Item = u64>) -> Self {
        TokenGrid {
            total_supply: total_supply.filter(|s| *s > 0).unwrap_or(FALLBACK_SUPPLY),
            minted: minted_ids.into_iter().collect(),
        }
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn minted_count(&self) -> usize {
        self.minted.len()
    }

    pub fn page(
        &self,
        page: usize,
        only_minted: bool,
        image_url: impl Fn(u64) -> String,
    ) -> Page<MintedToken> {
        let ids = if only_minted {
            let minted = self
                .minted
                .iter()
                .copied()
                .filter(|id| (1..=self.total_supply).contains(id))
                .sorted();

            Listing::new().page(page, TOKEN_GRID_PAGE_SIZE).apply(minted)
        } else {
            self.supply_page(page)
        };

        ids.map(|id| MintedToken {
            id,
            image_url: image_url(id),
            minted: self.minted.contains(&id),
        })
    }

    // 按页号直接计算 id 区间，不展开整个供应量
    fn supply_page(&self, page: usize) -> Page<u64> {
        let page = page.max(1);
        let size = TOKEN_GRID_PAGE_SIZE as u64;
        let start = (page as u64 - 1).saturating_mul(size).saturating_add(1);
        let end = start.saturating_add(size - 1).min(self.total_supply);

        Page {
            items: (start..=end).collect(),
            page,
            page_size: TOKEN_GRID_PAGE_SIZE,
            total: usize::try_from(self.total_supply).unwrap_or(usize::MAX),
            total_pages: usize::try_from(self.total_supply.div_ceil(size)).unwrap_or(usize::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(floor: f64, total: f64, day: f64) -> NftMarket {
        NftMarket {
            floor_price: floor,
            total_volume: total,
            volume_24h: day,
            change_24h: 0.0,
        }
    }

    fn thumbnail(tick: &str) -> String {
        format!("https://cache.example/thumbnail/{tick}/1")
    }

    fn sample() -> Vec<NftCollection> {
        let markets = HashMap::from([
            ("KAS".to_string(), market(1.0, 1.0, 1.0)),
            ("NACHO".to_string(), market(120.0, 5000.0, 0.0)),
            ("KANGO".to_string(), market(40.0, 9000.0, 300.0)),
            ("BITCOIN".to_string(), market(900.0, 100.0, 50.0)),
        ]);

        let deployments = vec![Krc721Deployment {
            tick: "NACHO".to_string(),
            max: Some(10_000),
            minted: Some(2_500),
            premint: Some(10),
            ..Default::default()
        }];

        join_collections(&markets, deployments, thumbnail)
    }

    #[test]
    fn test_join_collections() {
        let collections = sample();
        assert_eq!(collections.len(), 3);

        let nacho = collections.iter().find(|c| c.tick.as_ref() == "NACHO");
        let nacho = nacho.map(|c| (c.total_supply, c.minted_percentage, c.premint));
        assert_eq!(nacho, Some((Some(10_000), Some(25.0), 10)));

        let kango = collections.iter().find(|c| c.tick.as_ref() == "KANGO");
        assert_eq!(kango.and_then(|c| c.total_supply), None);
        assert_eq!(
            kango.map(|c| c.thumbnail_url.as_str()),
            Some("https://cache.example/thumbnail/KANGO/1")
        );
    }

    #[test]
    fn test_collection_tabs() {
        let ticks = |tab: CollectionTab| {
            tab.listing(None)
                .apply(sample())
                .items
                .into_iter()
                .map(|c| c.tick.to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(ticks(CollectionTab::Trending), vec!["KANGO", "BITCOIN"]);
        assert_eq!(ticks(CollectionTab::Top), vec!["KANGO", "NACHO", "BITCOIN"]);
        assert_eq!(ticks(CollectionTab::Recent), vec!["KANGO", "BITCOIN", "NACHO"]);
        assert_eq!(ticks(CollectionTab::Floor), vec!["BITCOIN", "NACHO", "KANGO"]);
    }

    #[test]
    fn test_collection_search() {
        let page = CollectionTab::Top.listing(Some("nac")).apply(sample());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn test_tab_from_str() -> anyhow::Result<()> {
        assert_eq!("top".parse::<CollectionTab>()?, CollectionTab::Top);
        Ok(())
    }

    #[test]
    fn test_token_grid() {
        let grid = TokenGrid::new(Some(250), [1, 2, 150]);
        let image = |id: u64| format!("https://cache.example/thumbnail/NACHO/{id}");

        let first = grid.page(1, false, image);
        assert_eq!(first.total, 250);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items.len(), 100);
        assert!(first.items[0].minted);
        assert!(!first.items[2].minted);

        let minted = grid.page(1, true, image);
        let ids = minted.items.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 150]);
    }

    #[test]
    fn test_token_grid_huge_supply_pages_lazily() {
        let grid = TokenGrid::new(Some(u64::MAX), [u64::MAX - 1]);
        let image = |id: u64| id.to_string();

        let page = grid.page(3, false, image);
        assert_eq!(page.items.first().map(|t| t.id), Some(201));
        assert_eq!(page.items.len(), TOKEN_GRID_PAGE_SIZE);

        let minted = grid.page(1, true, image);
        assert_eq!(minted.total, 1);
        assert!(minted.items[0].minted);
    }

    #[test]
    fn test_token_grid_last_page() {
        let grid = TokenGrid::new(Some(250), [250]);
        let page = grid.page(3, false, |id| id.to_string());
        assert_eq!(page.items.len(), 50);
        assert_eq!(page.items.last().map(|t| (t.id, t.minted)), Some((250, true)));
        assert!(grid.page(4, false, |id| id.to_string()).items.is_empty());
    }

    #[test]
    fn test_token_grid_fallback_supply() {
        let grid = TokenGrid::new(None, []);
        assert_eq!(grid.total_supply(), FALLBACK_SUPPLY);
        assert_eq!(grid.minted_count(), 0);
    }
}
