use connect4_search::anyhow::Result;
use connect4_search::export::ArtifactWriter;
use connect4_search::{Board, Comparison, Connect4Error, DiffStatus};

#[test]
fn comparison_writes_every_artifact() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("outputs");
    let board = Board::from_moves("3342")?;
    let comparison = Comparison::run(&board, board.to_move(), 4, 2)?;

    let writer = ArtifactWriter::new(&out)?;
    let written = writer.write_comparison("3342", &board, &comparison)?;
    assert_eq!(written.len(), 7);

    for name in [
        "tree_minimax.dot",
        "tree_minimax.json",
        "tree_alphabeta.dot",
        "tree_alphabeta.json",
        "decision_diff.dot",
        "performance_comparison.txt",
        "snapshots/move_00.txt",
    ]
    .iter()
    {
        assert!(out.join(name).is_file(), "missing {}", name);
    }

    let json = std::fs::read_to_string(out.join("tree_alphabeta.json"))?;
    let nodes: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(
        nodes.as_array().map(|nodes| nodes.len()),
        Some(comparison.alphabeta.trace.len())
    );

    let diff = std::fs::read_to_string(out.join("decision_diff.dot"))?;
    assert!(diff.contains("Decision: SAME"));
    if comparison.diff.count(DiffStatus::Pruned) > 0 {
        assert!(diff.contains("pruned"));
    }

    let summary = std::fs::read_to_string(out.join("performance_comparison.txt"))?;
    assert!(summary.contains("Position: 3342"));
    assert!(summary.contains("Depth limit: 4"));
    Ok(())
}

#[test]
fn unwritable_output_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // a file where the output directory should be
    let blocker = dir.path().join("outputs");
    std::fs::write(&blocker, "")?;

    match ArtifactWriter::new(&blocker) {
        Err(Connect4Error::Io { path, .. }) => assert_eq!(path, blocker),
        other => panic!("expected an io error, got {:?}", other.map(|w| w.dir().to_path_buf())),
    }
    Ok(())
}
