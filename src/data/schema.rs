use std::sync::Arc;

use super::{Data, DataContext, DataManager, DataType, Grant, LifeSpan, UserId};

/// A declarative list of permission records, evaluated once at bootstrap.
///
/// ```
/// use treeflow::{DataFramework, Grant, LifeSpan, Data};
///
/// struct Recv;
/// struct Calc;
/// struct Frame(u64);
/// impl Data for Frame {}
///
/// let mut framework = DataFramework::new();
/// framework.install(
///     treeflow::Schema::new()
///         .grant::<Recv, Frame>(LifeSpan::Frame, Grant::Create)
///         .grant::<Calc, Frame>(LifeSpan::Frame, Grant::Read),
/// );
/// ```
#[derive(Default)]
pub struct Schema {
    records: Vec<Record>,
}

struct Record {
    user:  UserId,
    data:  DataType,
    span:  LifeSpan,
    grant: Grant,
    apply: fn(&mut DataManager, UserId, LifeSpan, Grant) -> bool,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self { Self::default() }

    /// Appends a record granting `U` the given access to `(T, span)`.
    pub fn grant<U: 'static, T: Data>(mut self, span: LifeSpan, grant: Grant) -> Self {
        self.records.push(Record {
            user: UserId::of::<U>(),
            data: DataType::of::<T>(),
            span,
            grant,
            apply: apply_record::<T>,
        });
        self
    }
}

fn apply_record<T: Data>(
    manager: &mut DataManager,
    user: UserId,
    span: LifeSpan,
    grant: Grant,
) -> bool {
    manager.apply::<T>(user, span, grant)
}

/// Per-application root of the data tree.
///
/// Owns the manager during bootstrap and hands out the shared
/// [`DataContext`] that algorithms and schedulers use. All registration must
/// happen before the context is first shared; the framework enforces this
/// structurally instead of locking the registry.
pub struct DataFramework {
    context: Arc<DataContext>,
}

impl DataFramework {
    /// Creates an empty framework.
    pub fn new() -> Self {
        Self { context: Arc::new(DataContext::new(DataManager::default())) }
    }

    fn manager_mut(&mut self) -> &mut DataManager {
        Arc::get_mut(&mut self.context)
            .expect("permissions must be registered before the context is shared")
            .manager_mut()
    }

    /// Registers a single grant inline. Returns `false` on a conflict.
    pub fn register<U: 'static, T: Data>(&mut self, span: LifeSpan, grant: Grant) -> bool {
        self.manager_mut().apply::<T>(UserId::of::<U>(), span, grant)
    }

    /// Installs every record of the schema.
    ///
    /// # Panics
    /// Panics on the first conflicting record; conflicting declarations are
    /// bootstrap bugs and must not reach a run.
    pub fn install(&mut self, schema: Schema) {
        for record in &schema.records {
            if !(record.apply)(self.manager_mut(), record.user, record.span, record.grant) {
                panic!(
                    "conflicting permission record: {:?} on {} in {:?} by {}",
                    record.grant, record.data, record.span, record.user,
                );
            }
        }
    }

    /// The shared data context.
    pub fn context(&self) -> Arc<DataContext> { Arc::clone(&self.context) }

    /// Destroys and re-seeds every slot in `span`.
    pub fn reset_span(&self, span: LifeSpan) { self.context.manager().reset_span(span) }

    /// Runs the clear hook on every constructed value in `span`.
    pub fn clear_span(&self, span: LifeSpan) { self.context.manager().clear_span(span) }
}

impl Default for DataFramework {
    fn default() -> Self { Self::new() }
}
