use anyhow::Result;
use revgraph::{compose_graph, ParentEdge, Revision, Snapshot, StackState};

fn rev(commit_id: &str, change_id: &str, parents: &[&str]) -> Revision {
    Revision::new(
        commit_id,
        change_id,
        parents.iter().map(|p| ParentEdge::direct(*p)).collect(),
    )
}

/// A small synthetic repository: trunk, a collapsible feature run ending in
/// the working copy, and a merge that pulled trunk into a side branch.
fn demo_snapshot() -> Snapshot {
    let mut root = rev("r0", "zzzz", &[]);
    root.is_trunk = true;
    root.is_immutable = true;

    let mut main_tip = rev("t1", "yyyy", &["r0"]);
    main_tip.is_trunk = true;
    main_tip.is_immutable = true;
    main_tip.bookmarks.push("main".to_string());

    let f1 = rev("f1", "aaaa", &["t1"]);
    let f2 = rev("f2", "bbbb", &["f1"]);
    let f3 = rev("f3", "cccc", &["f2"]);
    let mut wc = rev("w0", "dddd", &["f3"]);
    wc.is_working_copy = true;

    let side = rev("s1", "eeee", &["r0"]);
    let merge = rev("m1", "ffff", &["s1", "t1"]);

    Snapshot::new(vec![root, main_tip, f1, f2, f3, wc, side, merge])
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    println!("revgraph demo");
    println!("=============\n");

    let snapshot = demo_snapshot();
    let layout = compose_graph(&snapshot, None, &StackState::default())?;

    println!("revisions: {}", snapshot.len());
    println!("lanes:     {}", layout.data.lane_count);
    println!("stacks:    {}", layout.stacks.len());
    println!();

    for row in &layout.data.rows {
        let marker = if row.revision.is_working_copy { "@" } else { "o" };
        let mut line = String::new();
        line.push_str(&"  ".repeat(row.lane));
        line.push_str(marker);
        println!(
            "{line}  {} ({})  bookmarks: {:?}",
            row.revision.change_id, row.revision.commit_id, row.revision.bookmarks
        );
    }
    println!();

    for stack in &layout.stacks {
        println!(
            "stack {}: {} -> {} ({} hidden when collapsed)",
            stack.id,
            stack.top_change_id,
            stack.bottom_change_id,
            stack.intermediate_change_ids.len()
        );
    }
    println!();

    for binding in &layout.data.edge_bindings {
        let mut note = String::new();
        if binding.deemphasized {
            note.push_str(" [deemphasized]");
        }
        if binding.missing_stub {
            note.push_str(" [missing]");
        }
        println!(
            "edge {} -> {} (lanes {} -> {}){note}",
            binding.source, binding.target, binding.source_lane, binding.target_lane
        );
    }

    Ok(())
}
