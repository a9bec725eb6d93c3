//! Filter, search, sort and paginate over an in-memory token set.

use crate::models::{
    token_query::{Pagination, TokenListQuery},
    tokens::Token,
};

/// Keeps tokens in `query.tab` whose name or symbol contains the search term.
pub fn filter_tokens<'a, I>(tokens: I, query: &TokenListQuery) -> Vec<&'a Token>
where
    I: IntoIterator<Item = &'a Token>,
{
    let needle = query.search_term();
    tokens
        .into_iter()
        .filter(|t| query.tab.map_or(true, |tab| t.status == tab))
        .filter(|t| needle.as_deref().map_or(true, |n| t.matches_search(n)))
        .collect()
}

pub fn paginate<'s, T>(rows: &'s [T], pagination: &Pagination) -> &'s [T] {
    let start = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    if start >= rows.len() {
        return &[];
    }
    let end = start
        .saturating_add(pagination.page_size() as usize)
        .min(rows.len());
    &rows[start..end]
}

pub fn run<'a, I>(tokens: I, query: &TokenListQuery) -> (Vec<Token>, u64)
where
    I: IntoIterator<Item = &'a Token>,
{
    let mut rows = filter_tokens(tokens, query);
    // stable, and `SortConfig::compare` ends on a total order
    rows.sort_by(|a, b| query.sort.compare(a, b));

    let total = rows.len() as u64;
    let page = paginate(&rows, &query.pagination)
        .iter()
        .map(|t| (*t).clone())
        .collect();

    (page, total)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{
        sorts::SortConfig,
        tokens::{
            fixtures::{named, token},
            TokenStatus,
        },
    };

    fn ids(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.id.as_str()).collect()
    }

    fn mixed_tabs() -> Vec<Token> {
        (0..30)
            .map(|i| {
                let status = TokenStatus::ALL[i % 3];
                token(&format!("t{:02}", i), i as u32 + 1, status, &format!("{}", 100 - i))
            })
            .collect()
    }

    fn query(sort: &str, page: u32, page_size: u32) -> TokenListQuery {
        TokenListQuery {
            sort: SortConfig::parse(sort).unwrap(),
            pagination: Pagination::new(page, page_size).unwrap(),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(TokenStatus::New)]
    #[case(TokenStatus::Final)]
    #[case(TokenStatus::Migrated)]
    fn test_tab_filter_keeps_only_matching_status(#[case] tab: TokenStatus) {
        let tokens = mixed_tabs();
        let query = TokenListQuery {
            tab: Some(tab),
            ..query("", 1, 100)
        };

        let (page, total) = run(&tokens, &query);
        assert_eq!(total, 10);
        assert!(page.iter().all(|t| t.status == tab));
    }

    #[rstest]
    #[case("eth", vec!["eth", "weth"])]
    #[case("ETH", vec!["eth", "weth"])]
    #[case(" sol ", vec!["sol"])]
    #[case("coin", vec!["btc", "doge"])]
    #[case("", vec!["btc", "eth", "weth", "sol", "doge"])]
    fn test_search_matches_name_or_symbol(#[case] search: &str, #[case] expected: Vec<&str>) {
        let tokens = vec![
            named("btc", "Bitcoin", "BTC", TokenStatus::New),
            named("eth", "Ethereum", "ETH", TokenStatus::New),
            named("weth", "Wrapped Ether", "WETH", TokenStatus::New),
            named("sol", "Solana", "SOL", TokenStatus::New),
            named("doge", "Dogecoin", "DOGE", TokenStatus::New),
        ];
        let tokens: Vec<Token> = tokens
            .into_iter()
            .enumerate()
            .map(|(i, t)| Token {
                rank: i as u32 + 1,
                ..t
            })
            .collect();
        let query = TokenListQuery {
            search: Some(search.to_string()),
            ..query("", 1, 50)
        };

        let (page, total) = run(&tokens, &query);
        assert_eq!(ids(&page), expected);
        assert_eq!(total, expected.len() as u64);
    }

    #[test]
    fn test_price_sort_scenario() {
        let tokens = vec![
            token("a", 1, TokenStatus::New, "50"),
            token("b", 2, TokenStatus::New, "10"),
            token("c", 3, TokenStatus::New, "30"),
        ];
        let query = TokenListQuery {
            tab: Some(TokenStatus::New),
            ..query("price:asc", 1, 50)
        };

        let (page, _) = run(&tokens, &query);
        let prices: Vec<Decimal> = page.iter().map(|t| t.price).collect();
        let ranks: Vec<u32> = page.iter().map(|t| t.rank).collect();
        assert_eq!(
            prices,
            vec![Decimal::from(10), Decimal::from(30), Decimal::from(50)]
        );
        assert_eq!(ranks, vec![2, 3, 1]);
    }

    #[test]
    fn test_first_key_dominates_and_ties_fall_through() {
        let mut tokens = vec![
            token("a", 1, TokenStatus::New, "10"),
            token("b", 2, TokenStatus::New, "10"),
            token("c", 3, TokenStatus::New, "20"),
            token("d", 4, TokenStatus::New, "10"),
        ];
        tokens[0].change_24h = Decimal::new(1, 2);
        tokens[1].change_24h = Decimal::new(5, 2);
        tokens[2].change_24h = Decimal::new(9, 2);
        tokens[3].change_24h = Decimal::new(5, 2);

        let (page, _) = run(&tokens, &query("price:desc,change24h:desc", 1, 50));
        // c wins on price; b and d tie on both keys and fall back to rank
        assert_eq!(ids(&page), vec!["c", "b", "d", "a"]);

        let (page, _) = run(&tokens, &query("change24h:asc,price:asc", 1, 50));
        assert_eq!(ids(&page), vec!["a", "b", "d", "c"]);
    }

    #[test]
    fn test_empty_sort_uses_rank_order() {
        let tokens = vec![
            token("c", 3, TokenStatus::New, "1"),
            token("a", 1, TokenStatus::New, "1"),
            token("b", 2, TokenStatus::New, "1"),
        ];

        let (page, _) = run(&tokens, &query("", 1, 50));
        assert_eq!(ids(&page), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_second_page_is_items_ten_to_twenty() {
        let tokens = mixed_tabs();
        let (all, _) = run(&tokens, &query("price:asc", 1, 100));
        let (page, total) = run(&tokens, &query("price:asc", 2, 10));

        assert_eq!(total, 30);
        assert_eq!(page, all[10..20].to_vec());
    }

    #[test]
    fn test_page_beyond_end_is_empty_with_total() {
        let tokens = mixed_tabs();
        let (page, total) = run(&tokens, &query("", 4, 10));
        assert!(page.is_empty());
        assert_eq!(total, 30);

        let (page, total) = run(&tokens, &query("", u32::MAX, 500));
        assert!(page.is_empty());
        assert_eq!(total, 30);
    }

    #[test]
    fn test_identical_queries_yield_identical_pages() {
        let mut tokens = mixed_tabs();
        for t in tokens.iter_mut() {
            t.price = Decimal::ONE;
        }
        let query = query("price:asc", 2, 7);

        assert_eq!(run(&tokens, &query), run(&tokens, &query));
    }
}
