//! Chunks an iterable and processes chunks with bounded concurrency
//! (spec.md §4.I), using a small fixed-size worker pool over scoped threads.

use std::collections::VecDeque;
use std::sync::Mutex;

pub struct StreamProcessor {
    chunk_size: usize,
    concurrency: usize,
}

impl StreamProcessor {
    pub fn new(chunk_size: usize, concurrency: usize) -> Self {
        Self { chunk_size: chunk_size.max(1), concurrency: concurrency.max(1) }
    }

    /// Splits `items` into `chunk_size`-sized chunks and applies `f` to each,
    /// with at most `concurrency` chunks in flight. Results preserve chunk
    /// order regardless of completion order.
    pub fn process<T, R>(&self, items: Vec<T>, f: impl Fn(Vec<T>) -> Vec<R> + Sync) -> Vec<R>
    where
        T: Send,
        R: Send,
    {
        let chunks: Vec<Vec<T>> = items
            .into_iter()
            .fold(Vec::new(), |mut acc: Vec<Vec<T>>, item| {
                match acc.last_mut() {
                    Some(last) if last.len() < self.chunk_size => last.push(item),
                    _ => acc.push(vec![item]),
                }
                acc
            });

        let queue: Mutex<VecDeque<(usize, Vec<T>)>> = Mutex::new(chunks.into_iter().enumerate().collect());
        let total = queue.lock().unwrap().len();
        let results: Mutex<Vec<Option<Vec<R>>>> = Mutex::new((0..total).map(|_| None).collect());

        std::thread::scope(|scope| {
            let worker_count = self.concurrency.min(total.max(1));
            for _ in 0..worker_count {
                scope.spawn(|| loop {
                    let next = queue.lock().unwrap().pop_front();
                    let Some((index, chunk)) = next else { break };
                    let output = f(chunk);
                    results.lock().unwrap()[index] = Some(output);
                });
            }
        });

        results.into_inner().unwrap().into_iter().flatten().flatten().collect()
    }
}
