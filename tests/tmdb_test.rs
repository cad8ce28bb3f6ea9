//! TMDB API client tests
//!
//! Tests search, listing, caching, the request ceiling, and error handling
//! against a mock server.

use std::time::Duration;

use mockito::{Matcher, Server};

use cinetui::api::{DiscoverFilters, TrendingKind, TrendingWindow};
use cinetui::models::{MediaType, NO_OVERVIEW};
use cinetui::TmdbClient;

fn client_for(server: &Server) -> TmdbClient {
    TmdbClient::with_base_url("test_key", server.url())
        .with_retry_delay(Duration::from_millis(10))
}

const EMPTY_PAGE: &str = r#"{"page": 1, "results": [], "total_pages": 0, "total_results": 0}"#;

// =============================================================================
// Search Tests
// =============================================================================

#[tokio::test]
async fn test_search_parses_results() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "page": 1,
        "results": [
            {
                "id": 27205,
                "title": "Inception",
                "release_date": "2010-07-15",
                "overview": "A thief who steals corporate secrets",
                "poster_path": "/inception.jpg",
                "vote_average": 8.4,
                "vote_count": 33000,
                "popularity": 90.5,
                "genre_ids": [28, 878]
            },
            {
                "id": 157336,
                "title": "Interstellar",
                "release_date": "2014-11-05",
                "overview": "Space epic",
                "poster_path": "/interstellar.jpg",
                "vote_average": 8.4,
                "vote_count": 30000,
                "popularity": 80.1,
                "genre_ids": [12, 878]
            }
        ],
        "total_pages": 3,
        "total_results": 55
    }"#;

    let mock = server
        .mock("GET", "/search/movie")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "inception".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("include_adult".into(), "false".into()),
            Matcher::UrlEncoded("api_key".into(), "test_key".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = client_for(&server);
    let page = client.search_movies("inception", 1).await.unwrap();

    mock.assert_async().await;

    assert_eq!(page.results.len(), 2);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_results, 55);
    assert_eq!(page.results[0].id, 27205);
    assert_eq!(page.results[0].title, "Inception");
    assert_eq!(page.results[0].year, Some(2010));
    assert_eq!(page.results[0].genre_ids, vec![28, 878]);
}

#[tokio::test]
async fn test_search_rejects_blank_query() {
    let server = Server::new_async().await;
    let client = client_for(&server);

    assert!(client.search_movies("   ", 1).await.is_err());
    // Nothing was sent and nothing counted
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_search_applies_placeholders() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "page": 1,
        "results": [
            {"id": 7, "release_date": null, "overview": "", "poster_path": null}
        ],
        "total_pages": 1,
        "total_results": 1
    }"#;

    let mock = server
        .mock("GET", "/search/movie")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = client_for(&server);
    let page = client.search_movies("anything", 1).await.unwrap();

    mock.assert_async().await;

    let movie = &page.results[0];
    assert_eq!(movie.title, "Untitled");
    assert_eq!(movie.overview, NO_OVERVIEW);
    assert_eq!(movie.year, None);
    assert_eq!(movie.vote_average, 0.0);
}

#[tokio::test]
async fn test_multi_search_drops_person_rows() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "page": 1,
        "results": [
            {"id": 1, "media_type": "movie", "title": "Some Movie", "release_date": "2020-01-01"},
            {"id": 999, "media_type": "person", "name": "Some Actor"},
            {"id": 2, "media_type": "tv", "name": "Some Show", "first_air_date": "2021-05-15"}
        ],
        "total_pages": 1,
        "total_results": 3
    }"#;

    let mock = server
        .mock("GET", "/search/multi")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = client_for(&server);
    let page = client.multi_search("some", 1).await.unwrap();

    mock.assert_async().await;

    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].media_type, MediaType::Movie);
    assert_eq!(page.results[1].media_type, MediaType::Tv);
    assert_eq!(page.results[1].title, "Some Show");
}

// =============================================================================
// Cache Tests
// =============================================================================

#[tokio::test]
async fn test_repeat_query_is_cache_hit() {
    let mut server = Server::new_async().await;

    // Exactly one network request allowed for the repeated query+page
    let mock = server
        .mock("GET", "/search/movie")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EMPTY_PAGE)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    client.search_movies("dune", 1).await.unwrap();
    let count_after_first = client.request_count();

    client.search_movies("dune", 1).await.unwrap();

    mock.assert_async().await;
    assert_eq!(client.request_count(), count_after_first);
}

#[tokio::test]
async fn test_different_page_misses_cache() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/search/movie")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EMPTY_PAGE)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    client.search_movies("dune", 1).await.unwrap();
    client.search_movies("dune", 2).await.unwrap();

    mock.assert_async().await;
    assert_eq!(client.request_count(), 2);
}

#[tokio::test]
async fn test_clear_cache_forces_refetch() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/popular")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EMPTY_PAGE)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server);
    client.popular(1).await.unwrap();
    client.clear_cache();
    client.popular(1).await.unwrap();

    mock.assert_async().await;
}

// =============================================================================
// Request Ceiling Tests
// =============================================================================

#[tokio::test]
async fn test_request_ceiling_fails_fast() {
    let mut server = Server::new_async().await;

    // The server advertises an exhausted quota; the next fetch must fail
    // before any network call
    let mock = server
        .mock("GET", "/movie/popular")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("x-ratelimit-remaining", "1")
        .with_body(EMPTY_PAGE)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    client.popular(1).await.unwrap();
    assert_eq!(client.stats().request_limit, 1);

    let err = client.popular(2).await.unwrap_err();
    assert!(err.to_string().contains("request limit"));
    mock.assert_async().await;
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[tokio::test]
async fn test_unauthorized_maps_to_message() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/popular")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"status_message": "Invalid API key"}"#)
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.popular(1).await.unwrap_err();

    // Retries exhausted; the mapped message surfaces
    mock.assert_async().await;
    assert!(err.to_string().contains("Invalid API key"));
}

#[tokio::test]
async fn test_not_found_maps_to_message() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/99999999")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"status_code": 34}"#)
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.movie_details(99999999, &[]).await.unwrap_err();

    mock.assert_async().await;
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_rate_limit_maps_to_message() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/popular")
        .match_query(Matcher::Any)
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.popular(1).await.unwrap_err();

    mock.assert_async().await;
    assert!(err.to_string().contains("Too many requests"));
}

#[tokio::test]
async fn test_server_error_maps_to_message() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/trending/movie/day")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .trending(TrendingKind::Movie, TrendingWindow::Day)
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(err.to_string().contains("Server error (503)"));
}

#[tokio::test]
async fn test_retry_recovers_after_failure() {
    let mut server = Server::new_async().await;

    // First attempt fails with a server error, second succeeds
    let mock_500 = server
        .mock("GET", "/movie/popular")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let mock_200 = server
        .mock("GET", "/movie/popular")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EMPTY_PAGE)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.popular(1).await;

    assert!(result.is_ok());
    mock_500.assert_async().await;
    mock_200.assert_async().await;
    // One logical request despite the retry
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_invalid_json_is_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/popular")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not valid json {{{")
        .expect(3)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.popular(1).await.is_err());
    mock.assert_async().await;
}

// =============================================================================
// Detail and Expansion Tests
// =============================================================================

#[tokio::test]
async fn test_movie_details_with_expansions() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "id": 27205,
        "imdb_id": "tt1375666",
        "title": "Inception",
        "tagline": "Your mind is the scene of the crime.",
        "release_date": "2010-07-15",
        "runtime": 148,
        "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
        "overview": "A thief who steals corporate secrets",
        "vote_average": 8.4,
        "vote_count": 33000,
        "popularity": 90.5,
        "budget": 160000000,
        "revenue": 825532764,
        "status": "Released",
        "poster_path": "/inception.jpg",
        "backdrop_path": "/inception-backdrop.jpg",
        "credits": {
            "cast": [
                {"id": 6193, "name": "Leonardo DiCaprio", "character": "Cobb", "order": 0,
                 "profile_path": "/leo.jpg", "known_for_department": "Acting"}
            ],
            "crew": [
                {"id": 525, "name": "Christopher Nolan", "job": "Director",
                 "department": "Directing", "profile_path": null}
            ]
        },
        "videos": {
            "results": [
                {"id": "v1", "key": "YoHD9XEInc0", "name": "Official Trailer",
                 "site": "YouTube", "type": "Trailer", "official": true}
            ]
        },
        "similar": {
            "page": 1,
            "results": [{"id": 155, "title": "The Dark Knight", "release_date": "2008-07-16"}],
            "total_pages": 1,
            "total_results": 1
        },
        "recommendations": {
            "page": 1,
            "results": [{"id": 157336, "title": "Interstellar", "release_date": "2014-11-05"}],
            "total_pages": 1,
            "total_results": 1
        }
    }"#;

    let mock = server
        .mock("GET", "/movie/27205")
        .match_query(Matcher::UrlEncoded(
            "append_to_response".into(),
            "credits,videos,similar,recommendations".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = client_for(&server);
    let movie = client
        .movie_details(27205, &["credits", "videos", "similar", "recommendations"])
        .await
        .unwrap();

    mock.assert_async().await;

    assert_eq!(movie.title, "Inception");
    assert_eq!(movie.runtime, Some(148));
    assert_eq!(movie.formatted_runtime(), "2h 28m");
    assert_eq!(movie.genre_names(), "Action, Science Fiction");
    assert_eq!(movie.cast.len(), 1);
    assert_eq!(movie.directors()[0].name, "Christopher Nolan");
    assert_eq!(
        movie.trailer().and_then(|t| t.watch_url()).as_deref(),
        Some("https://www.youtube.com/watch?v=YoHD9XEInc0")
    );
    assert_eq!(movie.similar.len(), 1);
    assert_eq!(movie.recommendations[0].title, "Interstellar");
}

#[tokio::test]
async fn test_genres_endpoints() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/genre/movie/list")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"genres": [{"id": 28, "name": "Action"}, {"id": 18, "name": "Drama"}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let genres = client.movie_genres().await.unwrap();

    mock.assert_async().await;
    assert_eq!(genres.len(), 2);
    assert_eq!(genres[0].name, "Action");
}

#[tokio::test]
async fn test_discover_sends_filters() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/discover/movie")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("with_genres".into(), "28".into()),
            Matcher::UrlEncoded("primary_release_year".into(), "2020".into()),
            Matcher::UrlEncoded("sort_by".into(), "vote_average.desc".into()),
            Matcher::UrlEncoded("vote_average.gte".into(), "7.0".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(EMPTY_PAGE)
        .create_async()
        .await;

    let client = client_for(&server);
    let filters = DiscoverFilters {
        genre: Some(28),
        year: Some(2020),
        min_rating: Some(7.0),
        language: None,
        sort_by: Some("vote_average.desc".to_string()),
    };
    client.discover(&filters, 1).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_person_details() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "id": 6193,
        "name": "Leonardo DiCaprio",
        "profile_path": "/leo.jpg",
        "known_for_department": "Acting",
        "biography": "An American actor and producer.",
        "birthday": "1974-11-11",
        "place_of_birth": "Los Angeles, California, USA",
        "deathday": null,
        "homepage": null,
        "external_ids": {"imdb_id": "nm0000138"},
        "combined_credits": {
            "cast": [
                {"id": 27205, "title": "Inception", "media_type": "movie",
                 "release_date": "2010-07-15", "popularity": 90.5},
                {"id": 603, "title": "The Departed", "media_type": "movie",
                 "release_date": "2006-10-05", "popularity": 60.2},
                {"id": 1396, "name": "Some Guest Spot", "media_type": "tv",
                 "first_air_date": "2008-01-20", "popularity": 95.0}
            ]
        }
    }"#;

    let mock = server
        .mock("GET", "/person/6193")
        .match_query(Matcher::UrlEncoded(
            "append_to_response".into(),
            "combined_credits,external_ids".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = client_for(&server);
    let person = client.person_details(6193).await.unwrap();

    mock.assert_async().await;

    assert_eq!(person.name, "Leonardo DiCaprio");
    assert_eq!(person.birthday.as_deref(), Some("1974-11-11"));
    assert_eq!(
        person.imdb_url().as_deref(),
        Some("https://www.imdb.com/name/nm0000138")
    );

    // Filmography from combined credits, most prominent first
    assert_eq!(person.credits.len(), 3);
    assert_eq!(person.credits[0].title, "Some Guest Spot");
    assert_eq!(person.credits[1].title, "Inception");
    assert_eq!(person.known_for(2).len(), 2);
}

#[tokio::test]
async fn test_check_status() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/configuration")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"images": {}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(client.check_status().await);
    mock.assert_async().await;

    // Status probes bypass the request counter
    assert_eq!(client.request_count(), 0);
}
