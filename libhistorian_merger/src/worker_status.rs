/// What a worker is currently doing, used to colour its progress bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkerPhase {
    #[default]
    Merging,
    Exporting,
    Done,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    /// Fraction of the worker's directories completed, 0.0 to 1.0
    pub progress: f32,
    pub directory: String,
    pub worker_id: usize,
    pub phase: WorkerPhase,
}

impl WorkerStatus {
    pub fn new(progress: f32, directory: &str, worker_id: usize, phase: WorkerPhase) -> Self {
        Self {
            progress,
            directory: directory.to_string(),
            worker_id,
            phase,
        }
    }
}
