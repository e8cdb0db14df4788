use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("signplay_source_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn clip_json(frames: usize) -> String {
    let frame = r#"{ "pose": [{ "x": 0.5, "y": 0.5 }] }"#;
    format!("[{}]", vec![frame; frames].join(","))
}

#[test]
fn words_are_lowercased_and_stripped() {
    assert_eq!(words("  Hello, World!  "), vec!["hello", "world"]);
    assert_eq!(words("don't stop"), vec!["don't", "stop"]);
    assert!(words(" ?! ").is_empty());
}

#[test]
fn clip_library_concatenates_word_clips() {
    let dir = temp_dir("clips");
    std::fs::write(dir.join("hello.json"), clip_json(3)).unwrap();
    std::fs::write(dir.join("world.json"), clip_json(2)).unwrap();

    let mut lib = ClipLibrary::new(&dir);
    let set = lib.fetch("Hello world").unwrap();
    assert_eq!(set.sequences.len(), 2);
    assert_eq!(set.sequences[0].len(), 3);
    assert_eq!(set.total_frames(), 5);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn clip_library_reports_unknown_words() {
    let dir = temp_dir("unknown");
    std::fs::write(dir.join("hello.json"), clip_json(1)).unwrap();

    let mut lib = ClipLibrary::new(&dir);
    let err = lib.fetch("hello stranger").unwrap_err();
    assert!(matches!(err, SignplayError::SequenceFetch(_)));
    assert!(err.to_string().contains("stranger"));

    assert!(matches!(
        lib.fetch("   ").unwrap_err(),
        SignplayError::SequenceFetch(_)
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn json_file_source_maps_errors_to_fetch_failures() {
    let dir = temp_dir("json");
    let path = dir.join("set.json");
    std::fs::write(&path, format!(r#"{{ "sequences": [{}] }}"#, clip_json(4))).unwrap();

    let mut src = JsonFileSource::new(&path);
    assert_eq!(src.fetch("anything").unwrap().total_frames(), 4);

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(
        src.fetch("anything").unwrap_err(),
        SignplayError::SequenceFetch(_)
    ));

    let mut missing = JsonFileSource::new(dir.join("missing.json"));
    assert!(matches!(
        missing.fetch("x").unwrap_err(),
        SignplayError::SequenceFetch(_)
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn debounce_fires_once_after_input_settles() {
    let ms = Duration::from_millis;
    let mut d = InputDebounce::default();
    d.edit("he", ms(0));
    d.edit("hello", ms(200));
    assert_eq!(d.next_deadline(), Some(ms(700)));
    assert_eq!(d.poll(ms(600)), None);
    assert_eq!(d.poll(ms(700)).as_deref(), Some("hello"));
    assert_eq!(d.poll(ms(2_000)), None);

    // Unchanged text does not refetch.
    d.edit("hello", ms(800));
    assert_eq!(d.next_deadline(), None);
}

#[test]
fn debounce_emits_the_text_as_typed() {
    let ms = Duration::from_millis;
    let mut d = InputDebounce::new(ms(100));
    d.edit("  Hello world ", ms(0));
    assert_eq!(d.poll(ms(100)).as_deref(), Some("  Hello world "));

    // Whitespace is part of the text, so a trailing space is a new request.
    d.edit("  Hello world", ms(200));
    assert_eq!(d.poll(ms(300)).as_deref(), Some("  Hello world"));

    d.edit(" \t ", ms(400));
    assert_eq!(d.poll(ms(400)).as_deref(), Some(""));
}

#[test]
fn debounce_reports_cleared_input_immediately() {
    let ms = Duration::from_millis;
    let mut d = InputDebounce::new(ms(100));
    d.edit("hi", ms(0));
    d.edit("", ms(50));
    assert_eq!(d.poll(ms(50)).as_deref(), Some(""));
    d.edit("", ms(60));
    assert_eq!(d.poll(ms(1_000)), None);
}
