use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use super::group::{join_all, race_children, run_racer, spawn_worker};
use super::{ProcessContext, Processor, ProcessorId, ProcessorInfo, Status};

/// Builds one child processor per data instance of a data group.
pub type ProcessorFactory = Box<dyn Fn() -> Arc<dyn Processor> + Send + Sync>;

thread_local! {
    /// Data-parallel instance of the running task, per keyed type.
    static PARALLEL_INDICES: RefCell<HashMap<TypeId, usize>> = RefCell::new(HashMap::new());
}

/// The data-parallel instance currently assigned to this task for the keyed
/// type `T`, or `None` outside a `data_parallel`/`data_race` branch.
///
/// Algorithms use this to index the shared payload their fan-out replicates
/// over.
pub fn parallel_index<T: 'static>() -> Option<usize> {
    PARALLEL_INDICES.with(|indices| indices.borrow().get(&TypeId::of::<T>()).copied())
}

/// Scoped override of the instance index; restores the previous value on
/// drop, panics included.
struct InstanceGuard {
    key:      TypeId,
    previous: Option<usize>,
}

impl InstanceGuard {
    fn set<T: 'static>(index: usize) -> Self {
        let key = TypeId::of::<T>();
        let previous = PARALLEL_INDICES.with(|indices| indices.borrow_mut().insert(key, index));
        Self { key, previous }
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        PARALLEL_INDICES.with(|indices| {
            let mut indices = indices.borrow_mut();
            match self.previous {
                Some(previous) => {
                    indices.insert(self.key, previous);
                }
                None => {
                    indices.remove(&self.key);
                }
            }
        });
    }
}

/// Factory-based child management shared by the data-group composites: one
/// copy of the factory's processor per data instance, each instance marked
/// in the name path. Initialisation is idempotent.
struct DataGroup<T> {
    info:     ProcessorInfo,
    count:    usize,
    factory:  ProcessorFactory,
    children: Vec<Arc<dyn Processor>>,
    _ph:      PhantomData<fn() -> T>,
}

impl<T: 'static> DataGroup<T> {
    fn new(name: &str, count: usize, factory: ProcessorFactory) -> Self {
        Self {
            info: ProcessorInfo::new(name, ProcessorId::default()),
            count,
            factory,
            children: Vec::new(),
            _ph: PhantomData,
        }
    }

    fn init(&mut self, parent: &ProcessorInfo, child_index: u32) {
        if self.info.id() != ProcessorId::default() {
            // Re-initialisation is a no-op once the children exist.
            return;
        }
        self.info.assign(parent, child_index);

        for instance in 0..self.count {
            let mut child = (self.factory)();
            let instance_info =
                ProcessorInfo::new(format!("{}[{instance}]", self.info.name()), self.info.id());
            Arc::get_mut(&mut child)
                .expect("the factory must return exclusively owned plan nodes")
                .init(&instance_info, instance as u32 + 1);
            self.children.push(child);
        }
    }
}

/// Fan-out over factory-built children run concurrently and all joined, each
/// task tagged with its instance index for the keyed type `T`.
pub struct DataParallelProcessor<T> {
    group: DataGroup<T>,
}

impl<T: 'static> DataParallelProcessor<T> {
    /// Builds a group of `count` instances named `data_parallel`.
    pub fn new(count: usize, factory: ProcessorFactory) -> Self {
        Self { group: DataGroup::new("data_parallel", count, factory) }
    }
}

impl<T: 'static> Processor for DataParallelProcessor<T> {
    fn info(&self) -> &ProcessorInfo { &self.group.info }

    fn init(&mut self, parent: &ProcessorInfo, child_index: u32) {
        self.group.init(parent, child_index);
    }

    fn execute(&self, ctx: &ProcessContext) -> Status {
        let handles: Vec<_> = self
            .group
            .children
            .iter()
            .enumerate()
            .map(|(instance, child)| {
                let child = Arc::clone(child);
                let ctx = ctx.clone();
                let name = child.info().name().to_owned();
                spawn_worker(&name, move || {
                    let _instance = InstanceGuard::set::<T>(instance);
                    child.process(&ctx)
                })
            })
            .collect();
        join_all(handles)
    }
}

/// As [`DataParallelProcessor`], with race semantics: the first instance to
/// finish `Ok` wins and the rest are left to observe the stop flag.
pub struct DataRaceProcessor<T> {
    group: DataGroup<T>,
}

impl<T: 'static> DataRaceProcessor<T> {
    /// Builds a group of `count` instances named `data_race`.
    pub fn new(count: usize, factory: ProcessorFactory) -> Self {
        Self { group: DataGroup::new("data_race", count, factory) }
    }
}

impl<T: 'static> Processor for DataRaceProcessor<T> {
    fn info(&self) -> &ProcessorInfo { &self.group.info }

    fn init(&mut self, parent: &ProcessorInfo, child_index: u32) {
        self.group.init(parent, child_index);
    }

    fn execute(&self, ctx: &ProcessContext) -> Status {
        race_children(ctx, &self.group.children, |instance, child, sub, sender| {
            let name = child.info().name().to_owned();
            spawn_worker(&name, move || {
                let _instance = InstanceGuard::set::<T>(instance);
                run_racer(&*child, &sub, &sender);
            });
        })
    }
}
