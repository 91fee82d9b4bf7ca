//! All receivers of one session, handed to the engine as a [`ReportHub`]

use pkgbridge_engine::{self as engine, ReportCategory, ReportHub};
use pkgbridge_state::SharedSession;

use crate::download::{AuxDownloadReceiver, AuxKinds, DownloadProgressReceiver, ProvideReceiver};
use crate::media::MediaChangeReceiver;
use crate::package::{InstallReceiver, RemoveReceiver};
use crate::rpmdb::{DbKinds, RpmDbReceiver};
use crate::script::{MessageReceiver, ScriptReceiver};
use crate::source::{SourceCreateReceiver, SourceProbeReceiver, SourceRefreshReceiver};
use crate::trust::{DigestReceiver, KeyRingReceiver, KeySignalReceiver};

pub struct ReceiverSet {
    session: SharedSession,
    download: DownloadProgressReceiver,
    provide: ProvideReceiver,
    delta_download: AuxDownloadReceiver,
    delta_apply: AuxDownloadReceiver,
    patch_download: AuxDownloadReceiver,
    install: InstallReceiver,
    remove: RemoveReceiver,
    media: MediaChangeReceiver,
    source_create: SourceCreateReceiver,
    source_probe: SourceProbeReceiver,
    source_refresh: SourceRefreshReceiver,
    digest: DigestReceiver,
    key_ring: KeyRingReceiver,
    key_signal: KeySignalReceiver,
    script: ScriptReceiver,
    message: MessageReceiver,
    convert_db: RpmDbReceiver,
    rebuild_db: RpmDbReceiver,
}

impl ReceiverSet {
    #[must_use]
    pub fn new(session: SharedSession) -> Self {
        Self {
            download: DownloadProgressReceiver::new(session.clone()),
            provide: ProvideReceiver::new(session.clone()),
            delta_download: AuxDownloadReceiver::new(session.clone(), AuxKinds::DELTA_DOWNLOAD),
            delta_apply: AuxDownloadReceiver::new(session.clone(), AuxKinds::DELTA_APPLY),
            patch_download: AuxDownloadReceiver::new(session.clone(), AuxKinds::PATCH_DOWNLOAD),
            install: InstallReceiver::new(session.clone()),
            remove: RemoveReceiver::new(session.clone()),
            media: MediaChangeReceiver::new(session.clone()),
            source_create: SourceCreateReceiver::new(session.clone()),
            source_probe: SourceProbeReceiver::new(session.clone()),
            source_refresh: SourceRefreshReceiver::new(session.clone()),
            digest: DigestReceiver::new(session.clone()),
            key_ring: KeyRingReceiver::new(session.clone()),
            key_signal: KeySignalReceiver::new(session.clone()),
            script: ScriptReceiver::new(session.clone()),
            message: MessageReceiver::new(session.clone()),
            convert_db: RpmDbReceiver::new(session.clone(), DbKinds::CONVERT),
            rebuild_db: RpmDbReceiver::new(session.clone(), DbKinds::REBUILD),
            session,
        }
    }

    #[must_use]
    pub fn session(&self) -> &SharedSession {
        &self.session
    }
}

impl ReportHub for ReceiverSet {
    fn download(&mut self) -> &mut engine::DownloadReceiver {
        &mut self.download
    }

    fn provide(&mut self) -> &mut engine::ProvideReceiver {
        &mut self.provide
    }

    fn aux_download(
        &mut self,
        category: ReportCategory,
    ) -> Option<&mut engine::AuxDownloadReceiver> {
        match category {
            ReportCategory::DeltaDownload => Some(&mut self.delta_download),
            ReportCategory::DeltaApply => Some(&mut self.delta_apply),
            ReportCategory::PatchDownload => Some(&mut self.patch_download),
            _ => None,
        }
    }

    fn install(&mut self) -> &mut engine::InstallReceiver {
        &mut self.install
    }

    fn remove(&mut self) -> &mut engine::RemoveReceiver {
        &mut self.remove
    }

    fn media(&mut self) -> &mut engine::MediaReceiver {
        &mut self.media
    }

    fn source_create(&mut self) -> &mut engine::SourceCreateReceiver {
        &mut self.source_create
    }

    fn source_probe(&mut self) -> &mut engine::SourceProbeReceiver {
        &mut self.source_probe
    }

    fn source_refresh(&mut self) -> &mut engine::SourceRefreshReceiver {
        &mut self.source_refresh
    }

    fn digest(&mut self) -> &mut engine::DigestReceiver {
        &mut self.digest
    }

    fn key_ring(&mut self) -> &mut engine::KeyRingReceiver {
        &mut self.key_ring
    }

    fn key_signal(&mut self) -> &mut engine::KeySignalReceiver {
        &mut self.key_signal
    }

    fn script(&mut self) -> &mut engine::ScriptReceiver {
        &mut self.script
    }

    fn message(&mut self) -> &mut engine::MessageReceiver {
        &mut self.message
    }

    fn rpm_db(&mut self, category: ReportCategory) -> Option<&mut engine::RpmDbReceiver> {
        match category {
            ReportCategory::ConvertDb => Some(&mut self.convert_db),
            ReportCategory::RebuildDb => Some(&mut self.rebuild_db),
            _ => None,
        }
    }
}
