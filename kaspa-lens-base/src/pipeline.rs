use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 20;

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'a>;
type Comparator<'a, T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync + 'a>;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

// 过滤 -> 排序 -> 分页，所有列表视图共用
pub struct Listing<'a, T> {
    filter: Option<Predicate<'a, T>>,
    sort: Option<Comparator<'a, T>>,
    page: usize,
    page_size: usize,
}

impl<T> Default for Listing<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> Listing<'a, T> {
    pub fn new() -> Self {
        Listing {
            filter: None,
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'a) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    // 稳定排序，相等元素保持输入顺序
    pub fn sort_by(mut self, comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'a) -> Self {
        self.sort = Some(Box::new(comparator));
        self
    }

    // 页码从 1 开始，0 按 1 处理
    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page.max(1);
        self.page_size = page_size.max(1);
        self
    }

    pub fn apply(&self, items: impl IntoIterator<Item = T>) -> Page<T> {
        let mut items: Vec<T> = match &self.filter {
            Some(predicate) => items.into_iter().filter(|item| predicate(item)).collect(),
            None => items.into_iter().collect(),
        };

        if let Some(comparator) = &self.sort {
            items.sort_by(|a, b| comparator(a, b));
        }

        let total = items.len();
        let total_pages = total.div_ceil(self.page_size);
        let start = (self.page - 1).saturating_mul(self.page_size);

        let items = if start >= total {
            Vec::new()
        } else {
            items
                .into_iter()
                .skip(start)
                .take(self.page_size)
                .collect()
        };

        Page {
            items,
            page: self.page,
            page_size: self.page_size,
            total,
            total_pages,
        }
    }
}
