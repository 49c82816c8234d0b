// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Background application task processing.
//!
//! This module offloads work that may block, such as reading and scanning the
//! track catalog, from the main UI thread. A dedicated worker loop translates
//! [`AppTask`] requests into results and broadcasts them back to the
//! application via [`AppEvent`]s.
//!
//! Only actions that may block, or may take more than a trivial amount of time
//! to process, should be implemented as tasks. Other actions are likely more
//! suited to events.

use std::{
    sync::mpsc::{Receiver, Sender},
    thread,
};

use anyhow::Result;

use crate::{
    catalog::{self, CatalogSource},
    events::AppEvent,
};

#[derive(Debug)]
pub(crate) enum AppTask {
    LoadCatalog(CatalogSource),
}

/// Spawns a background thread to process application tasks.
///
/// The worker runs until every task sender has been dropped.
pub(crate) fn spawn_task_worker(task_rx: Receiver<AppTask>, event_tx: Sender<AppEvent>) {
    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            let ctx = TaskContext {
                event_tx: &event_tx,
            };

            if let Err(e) = handle_task(task, &ctx) {
                tracing::error!(error = %e, "task failed");
                let _ = event_tx.send(AppEvent::Error(e.to_string()));
            }
        }

        tracing::debug!("task worker stopped");
    });
}

/// Bundles shared resources required by task handlers.
struct TaskContext<'a> {
    event_tx: &'a Sender<AppEvent>,
}

fn handle_task(task: AppTask, ctx: &TaskContext) -> Result<()> {
    match task {
        AppTask::LoadCatalog(source) => load_catalog(ctx, &source),
    }
}

/// A failed load is reported as an event rather than an error, so the
/// application can fall back to an empty catalog.
fn load_catalog(ctx: &TaskContext, source: &CatalogSource) -> Result<()> {
    tracing::info!(?source, "loading catalog");

    let event = match catalog::load(source) {
        Ok(tracks) => {
            tracing::info!(tracks = tracks.len(), "catalog loaded");
            AppEvent::CatalogLoaded(tracks)
        }
        Err(e) => {
            let message = format!("{:#}", anyhow::Error::from(e));
            tracing::warn!(error = %message, "catalog unavailable");
            AppEvent::CatalogFailed(message)
        }
    };

    ctx.event_tx.send(event)?;

    Ok(())
}
