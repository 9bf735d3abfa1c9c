use bevy::log::debug;
use bevy::prelude::*;
use bevy::tasks::{ block_on, futures_lite::future, IoTaskPool, Task, TaskPool };

use crate::loader::DataLoader;
use crate::locale::{ Locale, DEFAULT_LOCALE };
use crate::messages::{ ChangeLocale, LoadSection, LocaleChanged, SectionLoaded, ToggleLocale };
use crate::store::LocaleStore;

/// Sections requested so far, in request order.
#[derive(Resource, Debug, Default)]
pub struct LoadedSections(Vec<String>);

impl LoadedSections {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// The locale listeners were last told about, starting from the one the store
/// was built with.
#[derive(Resource, Debug, Clone, Copy)]
pub(crate) struct AnnouncedLocale(Locale);

impl FromWorld for AnnouncedLocale {
    fn from_world(world: &mut World) -> Self {
        Self(world.get_resource::<LocaleStore>().map_or(DEFAULT_LOCALE, |store| store.current()))
    }
}

#[derive(Resource, Default)]
pub(crate) struct PendingLoads(Vec<Task<SectionLoaded>>);

pub(crate) fn apply_locale_requests(
    mut changes: MessageReader<ChangeLocale>,
    mut toggles: MessageReader<ToggleLocale>,
    mut store: ResMut<LocaleStore>
) {
    for ChangeLocale(locale) in changes.read() {
        store.set(*locale);
    }
    for _ in toggles.read() {
        store.toggle();
    }
}

pub(crate) fn announce_locale_changes(
    store: Res<LocaleStore>,
    mut announced: ResMut<AnnouncedLocale>,
    mut changed: MessageWriter<LocaleChanged>
) {
    let current = store.current();
    let previous = announced.0;
    if previous != current {
        changed.write(LocaleChanged { previous, current });
        announced.0 = current;
    }
}

pub(crate) fn reload_sections_on_locale_change(
    mut changed: MessageReader<LocaleChanged>,
    sections: Res<LoadedSections>,
    mut requests: MessageWriter<LoadSection>
) {
    if changed.read().last().is_none() {
        return;
    }
    for section in sections.iter() {
        requests.write(LoadSection(section.to_string()));
    }
}

pub(crate) fn start_section_loads(
    mut requests: MessageReader<LoadSection>,
    loader: Res<DataLoader>,
    store: Res<LocaleStore>,
    mut sections: ResMut<LoadedSections>,
    mut pending: ResMut<PendingLoads>
) {
    let pool = IoTaskPool::get_or_init(TaskPool::new);

    for LoadSection(section) in requests.read() {
        if !sections.0.contains(section) {
            sections.0.push(section.clone());
        }

        let loader = loader.clone();
        let section = section.clone();
        let locale = store.current();
        pending.0.push(
            pool.spawn(async move {
                let data = loader.load(&section, locale).await;
                SectionLoaded { section, locale, data }
            })
        );
    }
}

pub(crate) fn poll_section_loads(
    store: Res<LocaleStore>,
    mut pending: ResMut<PendingLoads>,
    mut loaded: MessageWriter<SectionLoaded>
) {
    let current = store.current();
    pending.0.retain_mut(|task| {
        let Some(result) = block_on(future::poll_once(task)) else {
            return true;
        };
        if result.locale == current {
            loaded.write(result);
        } else {
            debug!("Dropping stale {} data for '{}'", result.section, result.locale);
        }
        false
    });
}
