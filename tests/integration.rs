//! Integration tests: record framing, per-type rendering, stream termination, dump mode, loading.

use std::io::{Cursor, Write};
use vldadump::frame::{RecordStream, StreamEvent};
use vldadump::image::{load, read_image, LoadError, READ_CHUNK};
use vldadump::{write_stream, Decoder, Options, Record};

/// Frame a record body (type byte first) the way it sits on disk.
fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = (body.len() as u16).to_le_bytes().to_vec();
    out.extend_from_slice(body);
    if body.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn abs_body(code: u8, addr: u32, data: &[u8]) -> Vec<u8> {
    let mut b = vec![code, 0, 0, 0];
    b.extend_from_slice(&addr.to_le_bytes());
    b.extend_from_slice(data);
    b
}

fn u16s(b: &mut Vec<u8>, vals: &[u16]) {
    for v in vals {
        b.extend_from_slice(&v.to_le_bytes());
    }
}

/// ID record with names `demo`, `6502` and timestamp `Mon Oct 19` after the header.
fn id_body(siz: u16, maj: u16, min: u16, symsiz: u16, segsiz: u16) -> Vec<u8> {
    let mut b = vec![4, 0];
    u16s(&mut b, &[siz, maj, min, symsiz, segsiz, 22, 27, 32, 0, 1]);
    b.extend_from_slice(b"demo\0");
    b.extend_from_slice(b"6502\0");
    b.extend_from_slice(b"Mon Oct 19\0");
    b
}

fn symbol_body(ident: i32, value: i32, noff: u16, eoff: u16, tail: &[u8]) -> Vec<u8> {
    let mut b = vec![2, 0, 0x01, 0x00];
    b.extend_from_slice(&ident.to_le_bytes());
    b.extend_from_slice(&value.to_le_bytes());
    u16s(&mut b, &[noff, eoff]);
    b.extend_from_slice(tail);
    b
}

fn render(body: &[u8]) -> String {
    let decoder = Decoder::default();
    decoder.render(&Record::from_bytes(body)).join("\n")
}

fn events(data: &[u8], decoder: &Decoder) -> Vec<StreamEvent> {
    RecordStream::new(data, decoder).collect()
}

// --- Framing and the stream driver ---

#[test]
fn test_well_formed_stream_yields_one_event_per_record() {
    let mut data = frame(&id_body(22, 1, 0, 16, 28));
    data.extend(frame(&abs_body(0, 0x1000, &[0xa9, 0x00, 0x60])));
    data.extend(frame(&[5, 1, 13]));
    data.extend(frame(&[9, 0, 0, 0, 0, 0]));
    data.extend(frame(&[6, 1, 2, 3, 4]));

    let decoder = Decoder::default();
    let evs = events(&data, &decoder);
    assert_eq!(evs.len(), 5);
    assert!(evs.iter().all(|e| !e.is_terminal()));
    for (i, e) in evs.iter().enumerate() {
        assert_eq!(e.index(), i);
    }
}

#[test]
fn test_advance_rule_independent_of_content() {
    let bodies: Vec<Vec<u8>> = vec![
        abs_body(0, 0x1000, &[1, 2, 3]), // 11 bytes, padded
        vec![0, 1, 2],                   // ABS too small
        vec![5, 1, 0xff, 7],             // bad opcode
        vec![],                          // empty record
        vec![4, 0, 9],                   // truncated ID
        vec![200],                       // unknown type
    ];
    let mut data = Vec::new();
    for b in &bodies {
        data.extend(frame(b));
    }
    let decoder = Decoder::default();
    let mut stream = RecordStream::new(&data, &decoder);
    for b in &bodies {
        let before = stream.position();
        let ev = stream.next().expect("event");
        assert!(!ev.is_terminal(), "unexpected {:?}", ev);
        let n = b.len();
        assert_eq!(stream.position() - before, n + 2 + (n & 1));
    }
    assert!(stream.next().is_none());
    assert_eq!(stream.position(), data.len());
    assert_eq!(stream.records(), bodies.len());
}

#[test]
fn test_desync_stops_stream() {
    let mut data = frame(&abs_body(0, 0, &[1, 2]));
    data.extend_from_slice(&[0x00, 0x40, 0x05]);
    data.extend(frame(&[9, 0, 0, 0, 0, 0]));
    data.extend(frame(&[9, 0, 0, 0, 0, 0]));

    let decoder = Decoder::default();
    let evs = events(&data, &decoder);
    assert_eq!(evs.len(), 2);
    match &evs[1] {
        StreamEvent::Desync { index, header, .. } => {
            assert_eq!(*index, 1);
            assert_eq!(header.byte_count, 16384);
        }
        other => panic!("expected desync, got {:?}", other),
    }
    assert_eq!(
        evs[1].to_string(),
        "  1: 0x4000  05(EXPR) Record count >= 16384. Probably out of sync"
    );
}

#[test]
fn test_desync_is_only_line_printed() {
    let mut data = vec![0xff, 0xff, 0x00];
    data.extend(frame(&[9, 0, 0, 0, 0, 0]));
    let mut out = Vec::new();
    let summary = write_stream(&mut out, &data, &Decoder::default()).expect("write");
    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains("Probably out of sync"));
    assert_eq!(summary.records, 0);
    assert!(summary.stopped.is_some());
}

#[test]
fn test_truncated_record_stops_stream() {
    let data = [0x10, 0x00, 0x00, 1, 2];
    let decoder = Decoder::default();
    let evs = events(&data, &decoder);
    assert_eq!(evs.len(), 1);
    assert!(matches!(evs[0], StreamEvent::Truncated { available: 3, .. }));
    assert!(evs[0].to_string().contains("needs 16 bytes, 3 available"));
}

#[test]
fn test_stray_trailing_byte() {
    let mut data = frame(&abs_body(0, 0, &[1]));
    data.push(0x07);
    let decoder = Decoder::default();
    let evs = events(&data, &decoder);
    assert_eq!(evs.len(), 2);
    assert!(matches!(evs[1], StreamEvent::ShortHeader { index: 1, remaining: 1, .. }));
}

#[test]
fn test_two_byte_tail_is_short_header() {
    let mut data = frame(&[9, 0, 0, 0, 0, 0]);
    data.extend_from_slice(&[0x05, 0x00]);
    let decoder = Decoder::default();
    let evs = events(&data, &decoder);
    assert_eq!(evs.len(), 2);
    assert!(matches!(evs[1], StreamEvent::ShortHeader { index: 1, offset: 8, remaining: 2 }));
    let line = evs[1].to_string();
    assert_eq!(line, "  1: *** Short header: 2 trailing byte(s), too short for a record **");
    assert!(!line.contains("(ABS)"));
}

#[test]
fn test_two_byte_zero_count_tail_is_empty_record() {
    let mut data = frame(&[9, 0, 0, 0, 0, 0]);
    data.extend_from_slice(&[0x00, 0x00]);
    let decoder = Decoder::default();
    let evs = events(&data, &decoder);
    assert_eq!(evs.len(), 2);
    assert!(!evs[1].is_terminal());
    assert_eq!(evs[1].to_string(), "  1: 0x0000  *** Empty record **");
}

#[test]
fn test_missing_final_pad_byte_is_tolerated() {
    let mut data = frame(&abs_body(0, 0, &[1]));
    data.pop();
    let decoder = Decoder::default();
    let evs = events(&data, &decoder);
    assert_eq!(evs.len(), 1);
    assert!(!evs[0].is_terminal());
}

#[test]
fn test_empty_record() {
    let decoder = Decoder::default();
    let evs = events(&frame(&[]), &decoder);
    assert_eq!(evs[0].to_string(), "  0: 0x0000  *** Empty record **");
}

#[test]
fn test_write_stream_output() {
    let mut data = frame(&abs_body(0, 0x1000, &[0xa9, 0x00, 0x60]));
    data.extend(frame(&[9, 0, 0, 0, 0, 0]));
    let mut out = Vec::new();
    let summary = write_stream(&mut out, &data, &Decoder::default()).expect("write");
    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "  0: 0x000B* 0(ABS) 00001000 -> A9 00 60\n  1: 0x0006  9(TEST)\n"
    );
    assert_eq!(summary.records, 2);
    assert!(summary.stopped.is_none());
}

// --- Per-type rendering ---

#[test]
fn test_text_records() {
    assert_eq!(render(&abs_body(1, 0xdeadbeef, &[0x01])), "1(TXT) DEADBEEF -> 01");
    assert_eq!(render(&abs_body(8, 0x200, &[])), "8(XFER) 00000200 ->");
    let small = render(&[0, 0, 0x10]);
    assert!(small.starts_with("0(ABS) *** Size is too small. is 3, s/b > 8"), "{}", small);
}

#[test]
fn test_id_record_well_formed() {
    assert_eq!(
        render(&id_body(22, 1, 0, 16, 28)),
        "4(ID) err=0, warn=1, img=demo, target=6502, Mon Oct 19"
    );
}

#[test]
fn test_id_record_truncated() {
    let body = id_body(22, 1, 0, 16, 28);
    let out = render(&body[..10]);
    assert!(out.contains("too small"), "{}", out);
    assert!(out.contains("is 10,"), "{}", out);
    assert!(out.contains("s/b > 22"), "{}", out);
}

#[test]
fn test_id_record_timestamp_past_end() {
    let mut body = id_body(22, 1, 0, 16, 28);
    body[16] = 200;
    let out = render(&body);
    assert!(out.contains("Size is too small. is 43, s/b > 201"), "{}", out);
}

#[test]
fn test_id_record_version_mismatch() {
    let out = render(&id_body(22, 2, 0, 16, 28));
    assert!(out.contains("Version is 2.0. s/b 1.0"), "{}", out);
}

#[test]
fn test_id_record_reports_first_mismatch_only() {
    let out = render(&id_body(24, 2, 0, 10, 10));
    assert!(out.contains("VLDA_id struct size is 24. s/b 22"), "{}", out);
    assert!(!out.contains("Version"), "{}", out);

    let out = render(&id_body(22, 1, 0, 18, 28));
    assert_eq!(
        out,
        "4(ID) *** VLDA_sym struct size is 18. s/b 16 and VLDA_seg struct size is 28. s/b 28 **"
    );
}

#[test]
fn test_gsd_symbol_expression_before_name() {
    let mut tail = vec![3, 1, 7, 0, 8, 10, 3, b'+'];
    tail.extend_from_slice(b"start\0");
    let out = render(&symbol_body(5, -1, 24, 16, &tail));
    assert_eq!(
        out,
        "2(GSD) SYM: flags=0x0001, symb=start, ident=5, value=-1: Expr Terms=3 %7 10 +"
    );
}

#[test]
fn test_gsd_symbol_name_before_expression() {
    let mut tail = b"start\0".to_vec();
    tail.extend_from_slice(&[1, 13, 0xee]);
    let out = render(&symbol_body(5, 0, 16, 22, &tail));
    assert!(
        out.ends_with("symb=start, ident=5, value=0: Expr Terms=1 0 (+1 more bytes)"),
        "{}",
        out
    );
}

#[test]
fn test_gsd_symbol_without_expression() {
    let out = render(&symbol_body(1, 2, 0, 0, &[]));
    assert_eq!(out, "2(GSD) SYM: flags=0x0001, symb=<none>, ident=1, value=2: <no expression>");
}

#[test]
fn test_gsd_symbol_bad_offsets() {
    let out = render(&symbol_body(1, 2, 40, 0, &[]));
    assert!(out.contains("SYM: Size is too small. is 16, s/b > 41"), "{}", out);
    assert!(out.contains("symb=<bad offset 40>"), "{}", out);

    let out = render(&symbol_body(1, 2, 0, 30, &[]));
    assert!(out.contains("s/b > 30"), "{}", out);
    assert!(out.contains("eoff=30"), "{}", out);
}

#[test]
fn test_gsd_symbol_unterminated_name() {
    let out = render(&symbol_body(1, 2, 16, 0, b"abc"));
    assert!(out.contains("symb=<unterminated @16>"), "{}", out);
}

#[test]
fn test_gsd_segment() {
    let mut b = vec![2, 0, 0, 0];
    b.extend_from_slice(&3i32.to_le_bytes());
    u16s(&mut b, &[1, 2]);
    b.extend_from_slice(&0x1000u32.to_le_bytes());
    b.extend_from_slice(&0xffffu32.to_le_bytes());
    b.extend_from_slice(&0x10u32.to_le_bytes());
    u16s(&mut b, &[28, 0]);
    b.extend_from_slice(b".text\0");
    assert_eq!(
        render(&b),
        "2(GSD) SEG: flags=0x0000, segm=.text, ident=3, salign=1, dalign=2, base=0x1000, max=0xFFFF, offset=0x10"
    );

    let out = render(&b[..20]);
    assert!(out.contains("SEG: Size is too small. is 20, s/b > 28"), "{}", out);
}

#[test]
fn test_segment_length() {
    let mut b = vec![7, 0, 0, 0];
    b.extend_from_slice(&4i32.to_le_bytes());
    b.extend_from_slice(&0x400u32.to_le_bytes());
    assert_eq!(render(&b), "7(SLEN) ident=4, length=1024");
    let out = render(&b[..6]);
    assert!(out.contains("Size is too small. is 6, s/b > 12"), "{}", out);
}

#[test]
fn test_standalone_expression() {
    assert_eq!(render(&[5, 2, 13, 8, 5]), "5(EXPR) Expr Terms=2 0 5");
}

#[test]
fn test_raw_and_name_only_records() {
    assert_eq!(render(&[3, 0x00, 0x20]), "3(ORG) 00 20");
    assert_eq!(render(&[10, 0, b'a', b'b', 0, 0, 0, 0]), "10(DBGFILE) 00 61 62 00 00 00 00");
    assert_eq!(render(&[9, 0, 1, 2, 3, 4]), "9(TEST)");
    assert_eq!(render(&[12, 0, 1, 2, 3, 4]), "12(BOFF)");
    assert_eq!(render(&[99, 1, 2, 3]), "99(*Undefined*)");
}

#[test]
fn test_registered_minimum_size_is_enforced() {
    assert_eq!(render(&[10, b'a']), "10(DBGFILE) *** Size is too small. is 2, s/b > 8 **");
    assert_eq!(
        render(&[11, 0, 0, 0, 0, 0, 0]),
        "11(DBGSEG) *** Size is too small. is 7, s/b > 8 **"
    );
    assert_eq!(render(&[13]), "13(OOR) *** Size is too small. is 1, s/b > 6 **");
    assert_eq!(render(&[9, 0, 1, 2, 3]), "9(TEST) *** Size is too small. is 5, s/b > 6 **");
    // Types without a registered minimum render whatever they hold.
    assert_eq!(render(&[3]), "3(ORG)");
    assert_eq!(render(&[5]), "5(EXPR) Expr Terms=0");

    let decoder = Decoder::new(&Options::new(200, Some(16)).expect("options"));
    assert_eq!(
        decoder.render(&Record::from_bytes(&[11, 1, 2])),
        vec!["11(DBGSEG) *** Size is too small. is 3, s/b > 8 **".to_string()]
    );
}

#[test]
fn test_long_record_line_is_bounded() {
    let mut body = vec![6];
    body.extend(std::iter::repeat(0x5a).take(1000));
    let decoder = Decoder::default();
    let lines = decoder.render(&Record::from_bytes(&body));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].len() <= decoder.capacity());
    assert!(lines[0].ends_with(" more"), "{}", lines[0]);
}

// --- Hex/ASCII dump mode ---

#[test]
fn test_dump_mode_rows() {
    let options = Options::new(200, Some(16)).expect("options");
    let decoder = Decoder::new(&options);
    let mut body = vec![6];
    body.extend(0x41u8..0x41 + 20);
    let evs = events(&frame(&body), &decoder);
    let rec = match &evs[0] {
        StreamEvent::Record(r) => r,
        other => panic!("expected record, got {:?}", other),
    };
    assert_eq!(rec.lines.len(), 2);
    assert!(rec.lines[0].starts_with("6(TPR) 00000000 -> 41 42 43"));
    assert!(rec.lines[0].ends_with("|ABCDEFGHIJKLMNOP|"));
    assert!(rec.lines[1].starts_with("       00000010 -> 51 52 53 54 "));
    assert!(rec.lines[1].ends_with("|QRST            |"));
    assert_eq!(rec.lines[0].len(), rec.lines[1].len());

    let text = rec.to_string();
    let printed: Vec<&str> = text.lines().collect();
    assert_eq!(printed.len(), 2);
    assert!(printed.iter().all(|l| l.starts_with("  0: 0x0015* ")));
    assert!(printed.iter().all(|l| l.len() <= options.line_width()));
}

#[test]
fn test_dump_mode_text_address() {
    let decoder = Decoder::new(&Options::new(200, Some(4)).expect("options"));
    let lines = decoder.render(&Record::from_bytes(&abs_body(0, 0x2000, &[1, 2, 3, 4, 5])));
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("0(ABS) 00002000 -> 01 02 03 04 "));
    assert!(lines[1].starts_with("       00002004 -> 05 "));
}

#[test]
fn test_dump_mode_leaves_decoded_records_alone() {
    let decoder = Decoder::new(&Options::new(200, Some(16)).expect("options"));
    assert_eq!(
        decoder.render(&Record::from_bytes(&[5, 1, 8, 3])),
        vec!["5(EXPR) Expr Terms=1 3".to_string()]
    );
}

// --- Loading ---

#[test]
fn test_load_from_file() {
    let data = frame(&abs_body(0, 0x1000, &[1, 2, 3]));
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(&data).expect("write");
    let image = load(Some(file.path())).expect("load");
    assert_eq!(image.bytes, data);
    assert_eq!(image.extent, READ_CHUNK);
}

#[test]
fn test_read_image_grows_in_chunks() {
    let data = vec![0u8; READ_CHUNK + 10];
    let image = read_image(Cursor::new(&data)).expect("read");
    assert_eq!(image.bytes.len(), data.len());
    assert_eq!(image.extent, 2 * READ_CHUNK);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing.vlda");
    let err = load(Some(path.as_path())).expect_err("missing file");
    assert!(matches!(err, LoadError::Open { .. }));
    assert!(err.to_string().starts_with("Error opening '"), "{}", err);
}
