//! Spreadsheet model: the data-provider side of a virtualized grid
//!
//! A [`SpreadsheetModel`] subscribes to a [`ContentSource`] and turns every
//! published document into a fresh [`Workbook`]. Grid views pull from it
//! (`row_count`, `row`, `metadata`, `columns`) and listen to its two signals to
//! know when to re-query.
//!
//! Every query is answered from the workbook and active sheet at the time of
//! the call. Queries made before a document arrives, after disposal, or while
//! the active sheet names no sheet return empty values instead of failing.

use crate::cell_ref::CellRange;
use crate::config::GridConfig;
use crate::error::{ModelError, Result};
use crate::reader::{self, Content, Sheet, Workbook};
use crate::signal::{Signal, Subscription};
use crate::source::ContentSource;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub mod columns;
pub mod export;
pub mod extent;
pub mod metadata;
pub mod row;

pub use columns::{ColumnConfig, ColumnFormatter};
pub use metadata::{ColumnMetadata, RowMetadata};
pub use row::Row;

struct ModelState {
    config: GridConfig,
    workbook: RefCell<Option<Rc<Workbook>>>,
    active_sheet: RefCell<Option<String>>,
    workbook_changed: Signal<()>,
    sheet_changed: Signal<String>,
    subscription: RefCell<Option<Subscription>>,
    disposed: Cell<bool>,
}

impl ModelState {
    fn load(&self, content: &Content) -> Result<()> {
        if self.disposed.get() {
            log::debug!("ignoring content published after dispose");
            return Ok(());
        }

        // A parse failure returns here and leaves the current workbook in place
        let workbook = reader::parse_with_options(content, &self.config.parse_options())?;
        log::debug!(
            "installed {} workbook with {} sheet(s)",
            workbook.format,
            workbook.sheets.len()
        );

        let first = workbook.first_sheet_name().map(str::to_string);
        *self.workbook.borrow_mut() = Some(Rc::new(workbook));
        *self.active_sheet.borrow_mut() = first;

        self.workbook_changed.emit(&());
        Ok(())
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }

        if let Some(subscription) = self.subscription.borrow_mut().take() {
            subscription.unsubscribe();
        }
        self.workbook_changed.complete();
        self.sheet_changed.complete();
        self.workbook.borrow_mut().take();
        self.active_sheet.borrow_mut().take();
        log::debug!("spreadsheet model disposed");
    }
}

pub struct SpreadsheetModel {
    state: Rc<ModelState>,
}

impl SpreadsheetModel {
    /// Create a model fed by `source`, using the default configuration
    pub fn new(source: &ContentSource) -> Self {
        Self::with_config(source, GridConfig::default())
    }

    pub fn with_config(source: &ContentSource, config: GridConfig) -> Self {
        let state = Rc::new(ModelState {
            config,
            workbook: RefCell::new(None),
            active_sheet: RefCell::new(None),
            workbook_changed: Signal::new(),
            sheet_changed: Signal::new(),
            subscription: RefCell::new(None),
            disposed: Cell::new(false),
        });

        let weak = Rc::downgrade(&state);
        let subscription = source.subscribe(move |content| match weak.upgrade() {
            Some(state) => state.load(content),
            None => Ok(()),
        });
        *state.subscription.borrow_mut() = Some(subscription);

        Self { state }
    }

    /// Replace the workbook with one parsed from `content`.
    ///
    /// This is what the content source invokes on every publish. On success the
    /// first sheet becomes active and `workbook_changed` fires before this
    /// returns; on failure nothing changes.
    pub fn load(&self, content: &Content) -> Result<()> {
        self.state.load(content)
    }

    /// Stop listening to the content source and release the workbook.
    ///
    /// Both signals complete. Calling this more than once has no further effect.
    pub fn dispose(&self) {
        self.state.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.state.disposed.get()
    }

    /// Make `name` the active sheet and notify `sheet_changed`.
    ///
    /// The name is not validated; an unknown sheet makes every query return
    /// empty results until a valid one is selected.
    pub fn set_sheet(&self, name: impl Into<String>) {
        let name = name.into();
        log::debug!("active sheet set to '{name}'");
        *self.state.active_sheet.borrow_mut() = Some(name.clone());
        self.state.sheet_changed.emit(&name);
    }

    pub fn active_sheet(&self) -> Option<String> {
        self.state.active_sheet.borrow().clone()
    }

    /// Current workbook, if a document has been loaded
    pub fn workbook(&self) -> Option<Rc<Workbook>> {
        self.state.workbook.borrow().clone()
    }

    pub fn config(&self) -> &GridConfig {
        &self.state.config
    }

    /// Sheet names in workbook order; empty before the first load
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook()
            .map(|workbook| workbook.sheet_names().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Extent of the active sheet, anchored at A1
    pub fn extent(&self) -> CellRange {
        self.with_active_sheet(extent::sheet_extent)
            .unwrap_or_else(CellRange::origin)
    }

    /// Extent of a sheet looked up by name; fails if the workbook lacks it
    pub fn sheet_extent(&self, name: &str) -> Result<CellRange> {
        let workbook = self
            .workbook()
            .ok_or_else(|| ModelError::SheetNotFound(name.to_string()))?;
        Ok(extent::sheet_extent(workbook.sheet(name)?))
    }

    pub fn row_count(&self) -> u32 {
        self.extent().row_count()
    }

    /// Dense snapshot of row `index` of the active sheet
    pub fn row(&self, index: u32) -> Row {
        self.with_active_sheet(|sheet| row::materialize_row(sheet, extent::sheet_extent(sheet), index))
            .unwrap_or_else(|| Row::empty(index))
    }

    /// Merge hints for row `index` of the active sheet
    pub fn metadata(&self, index: u32) -> RowMetadata {
        self.with_active_sheet(|sheet| metadata::row_metadata(&sheet.merged_cells, index))
            .unwrap_or_default()
    }

    pub fn columns(&self) -> Vec<ColumnConfig> {
        self.with_active_sheet(|sheet| {
            columns::build_columns(sheet, extent::sheet_extent(sheet), &self.state.config)
        })
        .unwrap_or_default()
    }

    /// Export a sheet (the active one by default) as delimited text.
    ///
    /// Returns `Ok(None)` when there is no workbook or the sheet does not exist.
    pub fn to_csv(&self, sheet_name: Option<&str>) -> Result<Option<String>> {
        let Some(workbook) = self.workbook() else {
            return Ok(None);
        };
        let target = match sheet_name {
            Some(name) => name.to_string(),
            None => match self.active_sheet() {
                Some(name) => name,
                None => return Ok(None),
            },
        };
        match workbook.get_sheet(&target) {
            Some(sheet) => export::sheet_to_csv(sheet, self.state.config.csv_delimiter()).map(Some),
            None => Ok(None),
        }
    }

    /// Fires after a new workbook has been installed
    pub fn workbook_changed(&self) -> &Signal<()> {
        &self.state.workbook_changed
    }

    /// Fires with the new name after `set_sheet`
    pub fn sheet_changed(&self) -> &Signal<String> {
        &self.state.sheet_changed
    }

    fn with_active_sheet<R>(&self, f: impl FnOnce(&Sheet) -> R) -> Option<R> {
        let workbook = self.workbook()?;
        let active = self.active_sheet()?;
        workbook.get_sheet(&active).map(f)
    }
}

impl Drop for SpreadsheetModel {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for SpreadsheetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpreadsheetModel")
            .field("sheets", &self.sheet_names())
            .field("active_sheet", &self.active_sheet())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
