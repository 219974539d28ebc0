mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn empty_listing_uses_defaults() -> Result<()> {
    let server = common::TestServer::start().await?;

    let (status, body) = server.get_json("/api/trails").await?;

    assert_eq!(status, StatusCode::OK, "unexpected status {}: {}", status, body);
    let data = &body["data"];
    assert_eq!(data["page"], 1);
    assert_eq!(data["per_page"], 10);
    assert_eq!(data["total"], 0);
    assert_eq!(data["total_pages"], 0);
    assert_eq!(data["trails"].as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn pages_are_ordered_by_trail_id() -> Result<()> {
    let server = common::TestServer::start().await?;
    for i in 1..=5 {
        let res = server.create(common::OWNER, common::sample_trail(&format!("Trail {}", i))).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let (status, body) = server.get_json("/api/trails?page=2&per_page=2").await?;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["total"], 5);
    assert_eq!(data["total_pages"], 3);
    let names: Vec<&str> = data["trails"]
        .as_array()
        .map(|trails| trails.iter().filter_map(|t| t["Name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Trail 3", "Trail 4"]);

    // Past the end is an empty page, not an error
    let (status, body) = server.get_json("/api/trails?page=9&per_page=2").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["trails"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["data"]["total"], 5);

    Ok(())
}

#[tokio::test]
async fn per_page_is_capped() -> Result<()> {
    let server = common::TestServer::start().await?;
    for i in 1..=101 {
        let res = server.create(common::OWNER, common::sample_trail(&format!("Bulk {:03}", i))).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let (status, body) = server.get_json("/api/trails?per_page=500").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["per_page"], 100);
    assert_eq!(body["data"]["total"], 101);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["trails"].as_array().map(Vec::len), Some(100));

    let (_, body) = server.get_json("/api/trails?page=2&per_page=500").await?;
    assert_eq!(body["data"]["trails"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"]["trails"][0]["Name"], "Bulk 101");

    Ok(())
}

#[tokio::test]
async fn invalid_paging_is_rejected() -> Result<()> {
    let server = common::TestServer::start().await?;

    for query in ["page=0", "per_page=0", "page=-3", "page=abc"] {
        let (status, body) = server.get_json(&format!("/api/trails?{}", query)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} should be rejected: {}", query, body);
        assert_eq!(body["error"], true);
    }

    Ok(())
}
