use courier_core::{
    common_formats, max_attachments_for, max_chars_for, Attachment, MediaKind, Platform,
    PostSettings, PostType, PostUnitBuilder, RawPostSettings,
};
use strum::IntoEnumIterator;

#[test]
fn test_parse_flat_form_as_single_unit() {
    let raw = RawPostSettings::parse(
        r#"{
            "postType": "media",
            "platforms": ["threads", "bluesky"],
            "bodyText": "hello",
            "fileInfos": [{ "filename": "a.jpg", "altText": "alt" }]
        }"#,
    )
    .unwrap();

    let units = raw.units();
    assert_eq!(raw.platforms, vec!["threads", "bluesky"]);
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].post_type.as_deref(), Some("media"));
    assert_eq!(units[0].file_infos, vec![Attachment::new("a.jpg", "alt")]);
}

#[test]
fn test_parse_chained_form() {
    let raw = RawPostSettings::parse(
        r#"{
            "platforms": ["threads"],
            "posts": [
                { "postType": "text", "bodyText": "one" },
                { "postType": "text", "bodyText": "two" }
            ]
        }"#,
    )
    .unwrap();

    let bodies: Vec<_> = raw.units().into_iter().map(|u| u.body_text).collect();
    assert_eq!(bodies, vec!["one", "two"]);
}

#[test]
fn test_parse_keeps_unknown_values_as_strings() {
    let raw = RawPostSettings::parse(
        r#"{ "postType": "poll", "platforms": ["myspace"], "bodyText": "x" }"#,
    )
    .unwrap();
    assert_eq!(raw.platforms, vec!["myspace"]);
    assert_eq!(raw.units()[0].post_type.as_deref(), Some("poll"));
}

#[test]
fn test_parse_rejects_malformed_json() {
    let err = RawPostSettings::parse("{ not json").unwrap_err();
    assert!(err.message.contains("settings.json"));
}

#[test]
fn test_single_unit_serializes_to_flat_form() {
    let unit = PostUnitBuilder::default()
        .post_type(PostType::Text)
        .body_text("hi")
        .build()
        .unwrap();
    let settings = PostSettings::new(vec![Platform::Bluesky], vec![unit]);

    let json = RawPostSettings::from(&settings).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["postType"], "text");
    assert_eq!(value["bodyText"], "hi");
    assert!(value.get("posts").is_none());
}

#[test]
fn test_platform_names_round_trip() {
    for platform in Platform::iter() {
        assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        assert_eq!(platform.to_string(), platform.as_str());
    }
    assert!("myspace".parse::<Platform>().is_err());
}

#[test]
fn test_minimum_caps_across_platforms() {
    let selection = [Platform::Threads, Platform::Twitter];
    assert_eq!(max_chars_for(&selection), Some(280));
    assert_eq!(max_attachments_for(&selection), Some(4));
    assert_eq!(max_chars_for(&[]), None);
}

#[test]
fn test_common_formats_is_an_intersection() {
    let formats = common_formats(&[Platform::Instagram, Platform::Bluesky]);
    assert_eq!(formats, vec!["jpeg", "jpg"]);

    let formats = common_formats(&[Platform::Threads, Platform::Twitter]);
    assert_eq!(formats, vec!["jpeg", "jpg", "png", "mp4", "mov"]);
}

#[test]
fn test_media_kind_by_extension() {
    let limits = Platform::Threads.limits();
    assert_eq!(limits.media_kind("JPG"), Some(MediaKind::Image));
    assert_eq!(limits.media_kind("mov"), Some(MediaKind::Video));
    assert_eq!(limits.media_kind("webp"), None);
    assert!(!Platform::Instagram.limits().text_only());
}
