//! Markdown rendering of an [`InventoryAnalysis`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use super::InventoryAnalysis;
use crate::error::Result;

/// Presentation options for the inventory report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Example filenames listed per pattern before collapsing the rest
    pub max_examples: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { max_examples: 5 }
    }
}

/// A Markdown inventory report over one snapshot directory.
///
/// Rendering goes through [`fmt::Display`], so `report.to_string()` yields the
/// full document.
///
/// # Examples
///
/// ```rust
/// use fetch_kaggle::inventory::{analyze, InventoryReport};
///
/// let analysis = analyze(&[]);
/// let report = InventoryReport::new(&analysis, "data/20240101", "2024-01-01T00:00:00.000Z");
/// assert!(report.render().contains("*No patterns found*"));
/// ```
#[derive(Debug, Clone)]
pub struct InventoryReport<'a> {
    analysis: &'a InventoryAnalysis,
    directory: String,
    generated_at: String,
    options: ReportOptions,
}

impl<'a> InventoryReport<'a> {
    pub fn new(
        analysis: &'a InventoryAnalysis,
        directory: impl AsRef<Path>,
        generated_at: impl Into<String>,
    ) -> Self {
        Self {
            analysis,
            directory: directory.as_ref().display().to_string(),
            generated_at: generated_at.into(),
            options: ReportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// Renders the report as Markdown.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Renders the report and writes it to `path`, creating parent directories.
    pub async fn write(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.render()).await?;
        info!(path = %path.display(), "Inventory report written");
        Ok(path.to_path_buf())
    }

    fn write_distribution(
        f: &mut fmt::Formatter<'_>,
        label: &str,
        counts: &BTreeMap<String, u64>,
    ) -> fmt::Result {
        let mut rows: Vec<(&String, &u64)> = counts.iter().collect();
        // stable sort over name-ordered rows: ties stay alphabetical
        rows.sort_by(|a, b| b.1.cmp(a.1));

        writeln!(f, "| {label} | Files |")?;
        writeln!(f, "|{}|-------|", "-".repeat(label.len() + 2))?;
        for (name, count) in rows {
            writeln!(f, "| {name} | {count} |")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for InventoryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.analysis;
        let summary = &analysis.summary;

        writeln!(f, "# Kaggle Dataset Inventory Report")?;
        writeln!(f)?;
        writeln!(f, "**Generated:** {}", self.generated_at)?;
        writeln!(f)?;
        writeln!(f, "**Directory:** {}", self.directory)?;
        writeln!(f)?;
        writeln!(f, "---")?;
        writeln!(f)?;

        writeln!(f, "## Executive Summary")?;
        writeln!(f)?;
        writeln!(f, "- **Total Files:** {}", summary.total_files)?;
        writeln!(f, "- **Total Size:** {:.2} MB", summary.total_size_mb)?;
        writeln!(f, "- **Total Rows:** {}", summary.total_rows)?;
        writeln!(f, "- **Unique Patterns:** {}", analysis.patterns.len())?;
        writeln!(f, "- **Chains:** {}", analysis.chains.len())?;
        writeln!(f, "- **File Types:** {}", analysis.file_types.len())?;
        writeln!(f)?;

        writeln!(f, "## Files by Pattern")?;
        writeln!(f)?;
        if analysis.patterns.is_empty() {
            writeln!(f, "*No patterns found*")?;
            writeln!(f)?;
        }
        for group in &analysis.patterns {
            writeln!(f, "### {}", group.pattern)?;
            writeln!(f)?;
            writeln!(f, "**Files:** {}", group.files.len())?;
            writeln!(f)?;
            writeln!(f, "**Examples:**")?;
            writeln!(f)?;
            for file in group.files.iter().take(self.options.max_examples) {
                writeln!(f, "- {}", file.filename)?;
            }
            if group.files.len() > self.options.max_examples {
                writeln!(
                    f,
                    "- *... and {} more*",
                    group.files.len() - self.options.max_examples
                )?;
            }
            writeln!(f)?;
        }

        writeln!(f, "## Chain Distribution")?;
        writeln!(f)?;
        if analysis.chains.is_empty() {
            writeln!(f, "*No chains found*")?;
            writeln!(f)?;
        } else {
            Self::write_distribution(f, "Chain", &analysis.chains)?;
        }

        writeln!(f, "## File Type Distribution")?;
        writeln!(f)?;
        if analysis.file_types.is_empty() {
            writeln!(f, "*No file types found*")?;
            writeln!(f)?;
        } else {
            Self::write_distribution(f, "File Type", &analysis.file_types)?;
        }

        Ok(())
    }
}
