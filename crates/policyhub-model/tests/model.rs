//! Tests for policyhub-model types.

use insta::assert_snapshot;
use policyhub_model::{
    ApiError, BaseResponse, DEFAULT_PAGE_SIZE, FilterState, FilterUpdate, ListParams,
    PaginatedResponse, Policy,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

#[test]
fn list_params_query_uses_fixed_key_order() {
    let state = FilterState {
        categories: vec!["security".to_string()],
        page: 2,
        page_size: 20,
        ..FilterState::default()
    };
    assert_snapshot!(state.to_list_params().to_query(), @"?categories=security&page=2&pageSize=20");
}

#[test]
fn list_params_query_joins_and_encodes_lists() {
    let params = ListParams {
        search: Some("jwt auth".to_string()),
        categories: vec!["security".to_string(), "traffic control".to_string()],
        providers: vec!["WSO2".to_string()],
        platforms: Vec::new(),
        page: Some(1),
        page_size: Some(5),
    };
    assert_snapshot!(
        params.to_query(),
        @"?search=jwt%20auth&categories=security,traffic%20control&providers=WSO2&page=1&pageSize=5"
    );
}

#[test]
fn empty_list_params_have_no_query() {
    assert_eq!(ListParams::default().to_query(), "");
    assert_eq!(ListParams::with_page_size(1).to_query(), "?pageSize=1");
}

#[test]
fn location_query_is_minimal() {
    let state = FilterState::default().apply(
        FilterUpdate::default()
            .search("rate limit")
            .platforms(vec!["gateway".to_string()])
            .page(3),
    );
    assert_snapshot!(state.to_query(), @"search=rate%20limit&platforms=gateway&page=3");
}

#[test]
fn comma_in_list_value_encodes_like_a_separator() {
    let state = FilterState {
        categories: vec!["a,b".to_string()],
        ..FilterState::default()
    };
    let query = state.to_query();
    assert_snapshot!(query, @"categories=a,b");
    let decoded = FilterState::from_query(&query);
    assert_eq!(decoded.categories, vec!["a", "b"]);
    assert_eq!(decoded.to_query(), query);
}

#[test]
fn paginated_response_parses() {
    let json = r#"{
        "success": true,
        "data": [{"name": "cors", "version": "1.0.0", "displayName": "CORS", "provider": "WSO2", "isLatest": true}],
        "meta": {
            "trace_id": "t-1",
            "timestamp": "2024-01-01T00:00:00Z",
            "request_id": "r-1",
            "pagination": {"page": 1, "pageSize": 20, "totalItems": 1, "totalPages": 1}
        }
    }"#;
    let response: PaginatedResponse<Policy> = serde_json::from_str(json).expect("parse");
    assert_eq!(response.items().len(), 1);
    assert_eq!(response.pagination().total_items, 1);
    assert_eq!(response.meta.request.trace_id, "t-1");
}

#[test]
fn error_envelope_becomes_api_error() {
    let json = r#"{
        "success": false,
        "data": null,
        "error": {"code": "POLICY_NOT_FOUND", "message": "policy not found"},
        "meta": {"trace_id": "", "timestamp": "", "request_id": ""}
    }"#;
    let response: BaseResponse<Policy> = serde_json::from_str(json).expect("parse");
    let err: ApiError = response.into_data().unwrap_err();
    assert_eq!(err.code, "POLICY_NOT_FOUND");
    assert!(err.is_not_found());
}

fn word() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9,&=%+_.-]{0,12}"
}

/// List item that survives decoding unchanged once split on `,`: fragments
/// with no surrounding whitespace, joined by single commas.
fn list_item() -> impl Strategy<Value = String> {
    let fragment = "[a-zA-Z0-9&=%+_.-]([ a-zA-Z0-9&=%+_.-]{0,4}[a-zA-Z0-9&=%+_.-])?";
    prop::collection::vec(fragment, 1..3).prop_map(|fragments| fragments.join(","))
}

fn filter_state() -> impl Strategy<Value = FilterState> {
    filter_state_with(word)
}

fn canonical_filter_state() -> impl Strategy<Value = FilterState> {
    filter_state_with(list_item)
}

fn filter_state_with<S: Strategy<Value = String>>(
    item: impl Fn() -> S,
) -> impl Strategy<Value = FilterState> {
    (
        word(),
        prop::collection::vec(item(), 0..4),
        prop::collection::vec(item(), 0..4),
        prop::collection::vec(item(), 0..4),
        0_u32..50,
        0_u32..120,
    )
        .prop_map(
            |(search, categories, providers, platforms, page, page_size)| FilterState {
                search,
                categories,
                providers,
                platforms,
                page,
                page_size,
            },
        )
}

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn filter_round_trip_is_idempotent(state in filter_state()) {
        let once = FilterState::from_query(&state.to_query());
        let twice = FilterState::from_query(&once.to_query());
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.to_query(), twice.to_query());
        prop_assert!(once.page >= 1);
        prop_assert!(once.page_size >= 1);
    }

    #[test]
    fn canonical_query_survives_decoding(state in canonical_filter_state()) {
        let query = state.to_query();
        prop_assert_eq!(FilterState::from_query(&query).to_query(), query);
    }

    #[test]
    fn updates_without_page_reset_to_first(state in filter_state(), search in word()) {
        let next = state.apply(FilterUpdate::default().search(search));
        prop_assert_eq!(next.page, 1);
    }

    #[test]
    fn default_page_size_is_never_encoded(page in 1_u32..10) {
        let state = FilterState { page, page_size: DEFAULT_PAGE_SIZE, ..FilterState::default() };
        prop_assert!(!state.to_query().contains("pageSize"));
    }
}
