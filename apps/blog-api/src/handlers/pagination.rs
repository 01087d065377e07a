//! Page request extraction and pagination response headers.

use actix_web::{FromRequest, HttpRequest, HttpResponseBuilder, dev::Payload};
use std::future::{Ready, ready};
use url::form_urlencoded;

use blog_core::pagination::DEFAULT_PAGE_SIZE;
use blog_core::{Direction, Page, PageRequest, SortOrder};

/// Extracts a [`PageRequest`] from `page`, `size` and repeated `sort`
/// query parameters. Missing or malformed values fall back to defaults.
#[derive(Debug, Clone)]
pub struct Pageable(pub PageRequest);

impl Pageable {
    pub fn into_inner(self) -> PageRequest {
        self.0
    }
}

impl FromRequest for Pageable {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Pageable(parse_page_request(req.query_string()))))
    }
}

pub fn parse_page_request(query: &str) -> PageRequest {
    let mut page = 0;
    let mut size = DEFAULT_PAGE_SIZE;
    let mut sort = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "page" => page = value.trim().parse().unwrap_or(0),
            "size" => {
                size = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|s| *s > 0)
                    .unwrap_or(DEFAULT_PAGE_SIZE)
            }
            "sort" => sort.extend(parse_sort(&value)),
            _ => {}
        }
    }

    PageRequest::new(page, size).with_sort(sort)
}

/// `title,date,desc` sorts on both properties descending; the direction
/// defaults to ascending.
fn parse_sort(value: &str) -> Vec<SortOrder> {
    let parts: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let (properties, direction) = match parts.split_last() {
        Some((last, rest)) if last.eq_ignore_ascii_case("asc") => (rest, Direction::Asc),
        Some((last, rest)) if last.eq_ignore_ascii_case("desc") => (rest, Direction::Desc),
        _ => (parts.as_slice(), Direction::Asc),
    };

    properties
        .iter()
        .map(|property| SortOrder {
            property: property.to_string(),
            direction,
        })
        .collect()
}

fn page_uri(base_url: &str, query: Option<&str>, page: u64, size: u64) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    if let Some(query) = query {
        params.append_pair("query", query);
    }
    params
        .append_pair("page", &page.to_string())
        .append_pair("size", &size.to_string());
    format!("{}?{}", base_url, params.finish())
}

fn link_header<T>(page: &Page<T>, base_url: &str, query: Option<&str>) -> String {
    let mut link = String::new();

    if page.has_next() {
        link.push_str(&format!(
            "<{}>; rel=\"next\",",
            page_uri(base_url, query, page.number.saturating_add(1), page.size)
        ));
    }
    if page.has_previous() {
        link.push_str(&format!(
            "<{}>; rel=\"prev\",",
            page_uri(base_url, query, page.number - 1, page.size)
        ));
    }

    let last_page = page.total_pages().saturating_sub(1);
    link.push_str(&format!(
        "<{}>; rel=\"last\",",
        page_uri(base_url, query, last_page, page.size)
    ));
    link.push_str(&format!(
        "<{}>; rel=\"first\"",
        page_uri(base_url, query, 0, page.size)
    ));
    link
}

/// `X-Total-Count` and `Link` headers for a page served from `base_url`.
pub fn pagination_headers<T>(page: &Page<T>, base_url: &str) -> Vec<(&'static str, String)> {
    vec![
        ("X-Total-Count", page.total_elements.to_string()),
        ("Link", link_header(page, base_url, None)),
    ]
}

/// Like [`pagination_headers`], with the search query carried in every link.
pub fn search_pagination_headers<T>(
    query: &str,
    page: &Page<T>,
    base_url: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("X-Total-Count", page.total_elements.to_string()),
        ("Link", link_header(page, base_url, Some(query))),
    ]
}

pub fn apply_headers(builder: &mut HttpResponseBuilder, headers: Vec<(&'static str, String)>) {
    for header in headers {
        builder.insert_header(header);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u64, size: u64, total: u64) -> Page<()> {
        Page::new(Vec::new(), &PageRequest::new(number, size), total)
    }

    fn link<'a>(headers: &'a [(&'static str, String)]) -> &'a str {
        &headers[1].1
    }

    #[test]
    fn test_defaults_when_absent() {
        let request = parse_page_request("");
        assert_eq!(request, PageRequest::new(0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let request = parse_page_request("page=-1&size=abc");
        assert_eq!(request.page, 0);
        assert_eq!(request.size, DEFAULT_PAGE_SIZE);

        assert_eq!(parse_page_request("size=0").size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(parse_page_request("page=3&size=50000").size, 2000);
        assert_eq!(parse_page_request("page=3&size=5").page, 3);
    }

    #[test]
    fn test_multi_property_sort() {
        let request = parse_page_request("sort=title,date,desc&sort=id");

        assert_eq!(
            request.sort,
            vec![
                SortOrder::desc("title"),
                SortOrder::desc("date"),
                SortOrder::asc("id"),
            ]
        );
    }

    #[test]
    fn test_sort_encoded_comma() {
        let request = parse_page_request("sort=date%2Cdesc");
        assert_eq!(request.sort, vec![SortOrder::desc("date")]);
    }

    #[test]
    fn test_first_page_links() {
        let headers = pagination_headers(&page(0, 20, 45), "/api/entries");

        assert_eq!(headers[0], ("X-Total-Count", "45".to_string()));
        assert_eq!(
            link(&headers),
            "</api/entries?page=1&size=20>; rel=\"next\",\
             </api/entries?page=2&size=20>; rel=\"last\",\
             </api/entries?page=0&size=20>; rel=\"first\""
        );
    }

    #[test]
    fn test_middle_page_links() {
        let headers = pagination_headers(&page(1, 20, 45), "/api/entries");

        assert_eq!(
            link(&headers),
            "</api/entries?page=2&size=20>; rel=\"next\",\
             </api/entries?page=0&size=20>; rel=\"prev\",\
             </api/entries?page=2&size=20>; rel=\"last\",\
             </api/entries?page=0&size=20>; rel=\"first\""
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let headers = pagination_headers(&page(2, 20, 45), "/api/entries");

        assert!(!link(&headers).contains("rel=\"next\""));
        assert!(link(&headers).contains("</api/entries?page=1&size=20>; rel=\"prev\""));
    }

    #[test]
    fn test_empty_result_links() {
        let headers = pagination_headers(&page(0, 20, 0), "/api/entries");

        assert_eq!(headers[0].1, "0");
        assert_eq!(
            link(&headers),
            "</api/entries?page=0&size=20>; rel=\"last\",\
             </api/entries?page=0&size=20>; rel=\"first\""
        );
    }

    #[test]
    fn test_search_links_carry_encoded_query() {
        let headers = search_pagination_headers("title:rust & more", &page(0, 10, 5), "/api/_search/entries");

        assert_eq!(
            link(&headers),
            "</api/_search/entries?query=title%3Arust+%26+more&page=0&size=10>; rel=\"last\",\
             </api/_search/entries?query=title%3Arust+%26+more&page=0&size=10>; rel=\"first\""
        );
    }

    #[test]
    fn test_page_index_at_upper_bound_has_no_next_link() {
        let request = parse_page_request("page=18446744073709551615&size=20");
        let headers = pagination_headers(&Page::<()>::empty(&request), "/api/entries");

        assert_eq!(request.page, u64::MAX);
        assert!(!link(&headers).contains("rel=\"next\""));
        assert!(link(&headers).contains("page=18446744073709551614&size=20>; rel=\"prev\""));
    }
}
