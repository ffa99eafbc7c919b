use gr_triage::parser::{parse, CallSite, CorruptionPolicy, Location};
use gr_triage::utils::error::ParseErrorKind;
use pretty_assertions::assert_eq;

const DUMP: &str = concat!(
    "goroutine 1 [chan receive, 12 minutes]:\n",
    "main.main()\n",
    "\t/src/app/main.go:42 +0x1d\n",
    "\n",
    "goroutine 7 [select, 3 minutes, locked to thread]:\n",
    "runtime.gopark(0x4b1e58, 0xc000010000, 0x9, 0x18, 0x1)\n",
    "\t/usr/local/go/src/runtime/proc.go:381 +0xd6\n",
    "main.(*Server).loop(...)\n",
    "\t/src/app/server.go:88\n",
    "main.helper() (inline)\n",
    "\t<not available>\n",
    "...additional frames elided...\n",
    "created by main.(*Server).Start in goroutine 1\n",
    "\t/src/app/server.go:30 +0x8a\n",
    "\n",
    "\n",
    "\n",
    "goroutine 8 [running]:\n",
    "main.spin({0xc000012345?, 0x2}, _)\n",
    "\t/src/app/spin.go:5 +0x3\n",
    "created by main.start\n",
    "\t/src/app/main.go:20 +0x25\n",
);

#[test]
fn test_parse_realistic_dump() {
    let outcome = parse(DUMP.as_bytes(), CorruptionPolicy::Fatal).unwrap();
    let gs = outcome.dump.goroutines();

    assert!(outcome.skipped.is_empty());
    assert_eq!(gs.len(), 3);

    let main = &gs[0];
    assert_eq!(main.id, 1);
    assert_eq!(main.status, "chan receive");
    assert_eq!(main.minutes, 12);
    assert!(main.created_by.is_none());
    assert_eq!(main.frames().len(), 1);
    assert_eq!(main.base().call, CallSite::new("main.main", "/src/app/main.go", 42));
    assert!(main.base().args.is_empty());
    assert!(!main.base().args_elided);

    let server = &gs[1];
    assert_eq!(server.id, 7);
    assert_eq!(server.minutes, 3);
    assert!(server.locked);
    assert!(server.frames_elided);
    assert_eq!(server.frames().len(), 3);
    assert_eq!(server.base().args, vec![0x4b1e58, 0xc000010000, 9, 0x18, 1]);
    assert!(server.frames()[1].args_elided);
    assert_eq!(
        server.frames()[1].call.location,
        Some(Location {
            file: "/src/app/server.go".to_string(),
            line: 88
        })
    );
    assert!(server.frames()[2].inlined);
    assert_eq!(
        server.created_by,
        Some(CallSite::new("main.(*Server).Start", "/src/app/server.go", 30))
    );
    assert_eq!(server.creator, Some(1));

    let spin = &gs[2];
    assert_eq!(spin.base().args, vec![0xc000012345, 2]);
    assert_eq!(spin.creator, None);
}

#[test]
fn test_unavailable_frame_is_kept() {
    let input = concat!(
        "goroutine 3 [semacquire]:\n",
        "sync.runtime_Semacquire()\n",
        "\t<not available>\n",
        "main.wait()\n",
        "\t/src/w.go:9 +0x1\n",
    );
    let outcome = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap();
    let g = &outcome.dump.goroutines()[0];

    assert_eq!(g.frames().len(), 2);
    assert!(g.base().is_unavailable());
    assert_eq!(g.base().call.name, "sync.runtime_Semacquire");
    assert!(g.full_signature().contains("sync.runtime_Semacquire\n\t<unavailable>\n"));
}

#[test]
fn test_empty_and_blank_input_is_empty_dump() {
    for input in ["", "\n\n\n", "  \n\t\n"] {
        let outcome = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap();
        assert!(outcome.dump.is_empty());
        assert!(outcome.skipped.is_empty());
    }
}

#[test]
fn test_crlf_line_endings() {
    let input = "goroutine 2 [select]:\r\nmain.f()\r\n\t/f.go:1 +0x1\r\n";
    let outcome = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap();
    assert_eq!(outcome.dump.goroutines()[0].base().call, CallSite::new("main.f", "/f.go", 1));
}

#[test]
fn test_fatal_missing_location_reports_position() {
    let input = concat!(
        "goroutine 1 [running]:\n",
        "main.main()\n",
        "\t/m.go:1 +0x1\n",
        "\n",
        "goroutine 2 [select]:\n",
        "main.a()\n",
        "main.b()\n",
        "\t/b.go:1 +0x1\n",
    );
    let err = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap_err();

    assert_eq!(err.line, 6);
    assert_eq!(err.offset, input.find("main.a()").unwrap());
    assert_eq!(err.kind, ParseErrorKind::MissingLocation("main.a".to_string()));
    assert!(err.to_string().starts_with("line 6 (byte "));
}

#[test]
fn test_fatal_missing_header() {
    let input = "panic: boom\n\ngoroutine 1 [running]:\nmain.main()\n\t/m.go:1 +0x1\n";
    let err = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap_err();
    assert_eq!(err.line, 1);
    assert!(matches!(err.kind, ParseErrorKind::MissingHeader(_)));
}

#[test]
fn test_fatal_bad_line_number() {
    let input = "goroutine 1 [running]:\nmain.main()\n\t/m.go:abc +0x1\n";
    let err = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::InvalidInteger { context: "line number", .. }
    ));
}

#[test]
fn test_header_without_frames_is_rejected() {
    let input = "goroutine 4 [running]:\n\tgoroutine running on other thread; stack unavailable\n";
    assert!(parse(input.as_bytes(), CorruptionPolicy::Fatal).is_err());

    let input = "goroutine 4 [running]:\n";
    let err = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::EmptyStack(4));
}

#[test]
fn test_lenient_skips_bad_blocks() {
    let input = concat!(
        "SIGQUIT: quit\n",
        "PC=0x46b4a1 m=0 sigcode=0\n",
        "\n",
        "goroutine 1 [running]:\n",
        "main.main()\n",
        "\t/m.go:1 +0x1\n",
        "\n",
        "goroutine 2 [select]:\n",
        "main.a()\n",
        "\n",
        "goroutine 3 [select, 5 minutes]:\n",
        "main.b()\n",
        "\t/b.go:1 +0x1\n",
    );
    let outcome = parse(input.as_bytes(), CorruptionPolicy::Lenient).unwrap();

    let ids: Vec<u64> = outcome.dump.goroutines().iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![1, 3]);

    let skipped: Vec<usize> = outcome.skipped.iter().map(|s| s.line).collect();
    assert_eq!(skipped, vec![1, 8]);
}

#[test]
fn test_lenient_all_bad_is_empty_dump() {
    let outcome = parse(b"garbage\nmore garbage\n", CorruptionPolicy::Lenient).unwrap();
    assert!(outcome.dump.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
}

#[test]
fn test_frames_after_mid_stack_elision_marker_are_skipped() {
    let input = concat!(
        "goroutine 1 [running]:\n",
        "main.rec()\n",
        "\t/r.go:3 +0x1\n",
        "...10 frames elided...\n",
        "main.main()\n",
        "\t/m.go:9 +0x1\n",
    );
    let outcome = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap();
    let g = &outcome.dump.goroutines()[0];

    assert!(g.frames_elided);
    assert_eq!(g.frames().len(), 1);
    assert_eq!(g.base().call, CallSite::new("main.rec", "/r.go", 3));
}

#[test]
fn test_creator_after_skipped_outer_frames() {
    let input = concat!(
        "goroutine 5 [select]:\n",
        "main.rec()\n",
        "\t/r.go:3 +0x1\n",
        "...10 frames elided...\n",
        "main.rec()\n",
        "\t/r.go:3 +0x1\n",
        "main.loop(...)\n",
        "\t/l.go:4\n",
        "created by main.start in goroutine 1\n",
        "\t/m.go:20 +0x25\n",
        "\n",
        "goroutine 6 [select]:\n",
        "main.f()\n",
        "\t/f.go:1 +0x1\n",
    );
    let outcome = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap();
    let gs = outcome.dump.goroutines();

    assert_eq!(gs.len(), 2);
    assert_eq!(gs[0].frames().len(), 1);
    assert_eq!(gs[0].created_by, Some(CallSite::new("main.start", "/m.go", 20)));
    assert_eq!(gs[0].creator, Some(1));
}

#[test]
fn test_stray_location_after_elision_marker_rejected() {
    let input = concat!(
        "goroutine 1 [running]:\n",
        "main.main()\n",
        "\t/m.go:1 +0x1\n",
        "...additional frames elided...\n",
        "\t/o.go:1 +0x1\n",
    );
    let err = parse(input.as_bytes(), CorruptionPolicy::Fatal).unwrap_err();
    assert_eq!(err.line, 5);
}
