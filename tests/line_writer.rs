mod common;

use std::io::Write;

use common::CaptureBuf;
use logfan::{get_logger, main_logger, Level};
use regex::Regex;

#[test]
fn adapted_writer_logs_lines_and_releveling_sticks() {
    let buf = CaptureBuf::new();
    let main = get_logger("main");
    main.set_output(Box::new(buf.clone()));

    let mut writer = main.line_writer(Level::Debug);
    writer.write_all(b"x\n").unwrap();

    let line = buf.take();
    let pattern =
        Regex::new(r"\A\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}\.\d{6} main\.DEBUG x\n\z").unwrap();
    assert!(pattern.is_match(&line), "got: {:?}", line);

    // The override outlives the writer: a native Info emission on the same
    // handle is still labeled DEBUG. Documented sharp edge.
    main_logger().info("y");
    let line = buf.take();
    assert!(line.contains("main.DEBUG y\n"), "got: {:?}", line);

    // The threshold was lowered along with the relabeling, so debug-level
    // records now pass.
    main_logger().debug("z");
    assert!(buf.take().contains("main.DEBUG z\n"));
}

#[test]
fn one_write_may_carry_several_lines() {
    let buf = CaptureBuf::new();
    let logger = get_logger("chunks");
    logger.set_output(Box::new(buf.clone()));

    let mut writer = logger.line_writer(Level::Warn);
    writer.write_all(b"a\nb\ntail").unwrap();

    let captured = buf.take();
    assert!(captured.contains("chunks.WARN a\n"));
    assert!(captured.contains("chunks.WARN b\n"));
    assert!(!captured.contains("tail"));

    // The partial line stays buffered until flush.
    writer.flush().unwrap();
    assert!(buf.take().contains("chunks.WARN tail\n"));
}

#[test]
fn dropping_the_writer_flushes_the_remainder() {
    let buf = CaptureBuf::new();
    let logger = get_logger("dropped");
    logger.set_output(Box::new(buf.clone()));

    {
        let mut writer = logger.line_writer(Level::Info);
        writer.write_all(b"leftover").unwrap();
    }

    assert!(buf.take().contains("dropped.INFO leftover\n"));
}
