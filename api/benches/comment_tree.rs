use std::collections::HashMap;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::Rng;

// The binary crate can't be imported from a bench, so the assembly algorithm
// is mirrored here over a reduced row shape.

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("comment_tree");
    for p in [(10, 0.3), (100, 0.5), (1000, 0.5), (10000, 0.7), (100000, 0.7)].iter() {
        let comments = generate_comments(p.0, p.1);
        group.bench_function(BenchmarkId::new("assemble", p.0), |b| {
            b.iter(|| assemble(comments.clone()))
        });
    }
    group.finish();
}

#[derive(Clone)]
struct Comment {
    id: i32,
    reply_to: Option<i32>,
    body: String,
}

#[allow(dead_code)]
struct CommentNode {
    id: i32,
    reply_to: Option<i32>,
    body: String,
    replies: Vec<CommentNode>,
}

fn generate_comments(n: usize, reply_ratio: f64) -> Vec<Comment> {
    let mut rng = rand::rng();
    let mut comments = Vec::with_capacity(n);

    for i in 0..n {
        // replies always target an earlier comment, like they do in storage
        let reply_to = if i > 0 && rng.random_bool(reply_ratio) {
            Some(rng.random_range(0..i) as i32)
        } else {
            None
        };

        comments.push(Comment {
            id: i as i32,
            reply_to,
            body: "content".to_string(),
        });
    }

    comments
}

fn assemble(rows: Vec<Comment>) -> Result<Vec<CommentNode>, usize> {
    let total = rows.len();

    let mut by_target: HashMap<Option<i32>, Vec<Comment>> = HashMap::new();
    for row in rows {
        by_target.entry(row.reply_to).or_default().push(row);
    }

    let roots = by_target.remove(&None).unwrap_or_default();
    let mut consumed = 0;
    let tree = attach_replies(roots, &mut by_target, &mut consumed);

    if consumed != total {
        return Err(total - consumed);
    }

    Ok(tree)
}

fn attach_replies(
    level: Vec<Comment>,
    by_target: &mut HashMap<Option<i32>, Vec<Comment>>,
    consumed: &mut usize,
) -> Vec<CommentNode> {
    level
        .into_iter()
        .map(|comment| {
            *consumed += 1;

            let replies = by_target.remove(&Some(comment.id)).unwrap_or_default();
            let replies = attach_replies(replies, by_target, consumed);

            CommentNode {
                id: comment.id,
                reply_to: comment.reply_to,
                body: comment.body,
                replies,
            }
        })
        .collect()
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
