//! Static, name-keyed exclusion policy: libraries that belong to the OS baseline
//! and must never be redistributed.
//!
//! These predicates never touch the filesystem: a branch can be pruned before
//! the library is ever opened.

use crate::platform::Platform;

/// AppImage-derived baseline: the C library, X11/GL/audio stack, NSS modules.
const LINUX_EXCLUDE_LIST: &[&str] = &[
    "ld-linux.so.2",
    "ld-linux-x86-64.so.2",
    "libanl.so.1",
    "libasound.so.2",
    "libBrokenLocale.so.1",
    "libcidn.so.1",
    "libcom_err.so.2",
    "libc.so.6",
    "libdl.so.2",
    "libdrm.so.2",
    "libEGL.so.1",
    "libexpat.so.1",
    "libfontconfig.so.1",
    "libfreetype.so.6",
    "libfribidi.so.0",
    "libgbm.so.1",
    "libgcc_s.so.1",
    "libgio-2.0.so.0",
    "libglapi.so.0",
    "libGLdispatch.so.0",
    "libglib-2.0.so.0",
    "libGL.so.1",
    "libGLX.so.0",
    "libgmp.so.10",
    "libgobject-2.0.so.0",
    "libgpg-error.so.0",
    "libharfbuzz.so.0",
    "libICE.so.6",
    "libjack.so.0",
    "libm.so.6",
    "libmvec.so.1",
    "libnss_compat.so.2",
    "libnss_dns.so.2",
    "libnss_files.so.2",
    "libnss_hesiod.so.2",
    "libnss_nisplus.so.2",
    "libnss_nis.so.2",
    "libOpenGL.so.0",
    "libp11-kit.so.0",
    "libpango-1.0.so.0",
    "libpangocairo-1.0.so.0",
    "libpangoft2-1.0.so.0",
    "libpthread.so.0",
    "libresolv.so.2",
    "librt.so.1",
    "libSM.so.6",
    "libstdc++.so.6",
    "libthai.so.0",
    "libthread_db.so.1",
    "libusb-1.0.so.0",
    "libutil.so.1",
    "libuuid.so.1",
    "libX11.so.6",
    "libxcb-dri2.so.0",
    "libxcb-dri3.so.0",
    "libxcb.so.1",
    "libz.so.1",
];

/// Short hand-curated list of libraries observed to be strongly tied to the host
/// distribution (see `SharedLibraryFinderLinux.cpp::removeLibrariesInLocalExcludeList`).
const LINUX_LOCAL_EXCLUDE_LIST: &[&str] =
    &["libdbus-1.so.3", "libkeyutils.so.1", "libbz2.so.1.0", "liblzma.so.5", "libudev.so.1"];

/// Windows known-DLLs + core runtime + assorted undistributable libraries.
const WINDOWS_EXCLUDE_LIST: &[&str] = &[
    "HAL.DLL",
    "NTDLL.DLL",
    "KERNEL32.DLL",
    "GDI32.DLL",
    "USER32.DLL",
    "COMCTL32.DLL",
    "WS2_32.DLL",
    "ADVAPI32.DLL",
    "NETAPI32.DLL",
    "SHSCRAP.DLL",
    "WINMM.DLL",
    "MSVCRT.DLL",
    "USERENV.DLL",
    "mpr.DLL",
    "ole32.DLL",
    "shell32.DLL",
    "version.DLL",
    "crypt32.DLL",
    "dnsapi.DLL",
    "iphlpapi.DLL",
    "opengl32.DLL",
    "UxTheme.DLL",
    "dwmapi.DLL",
    "imm32.DLL",
    "oleaut32.DLL",
    "Secur32.DLL",
    "odbc32.DLL",
    "shfolder.DLL",
    "wsock32.DLL",
    "ucrtbase.dll",
    "ucrtbased.dll",
    "policymanager.dll",
    "WININET.dll",
    "bcp47mrm.dll",
    "KERNELBASE.dll",
    "wow64cpu.dll",
    "wowarmhw.dll",
    "xtajit.dll",
    "clbcatq.dll",
    "combase.dll",
    "COMDLG32.dll",
    "coml2.dll",
    "difxapi.dll",
    "gdiplus.dll",
    "IMAGEHLP.dll",
    "IMM32.dll",
    "MSCTF.dll",
    "NORMALIZ.dll",
    "NSI.dll",
    "PSAPI.dll",
    "rpcrt4.dll",
    "sechost.dll",
    "Setupapi.dll",
    "SHCORE.dll",
    "SHLWAPI.dll",
    "WLDAP32.dll",
    "wow64.dll",
    "wow64win.dll",
];

const MSVC_RUNTIME_PREFIXES: &[&str] =
    &["concrt", "msvcp", "vccorlib", "vcruntime", "vcamp", "vcomp"];

const DIRECT3D_11_LIBRARIES: &[&str] = &["d3d11.dll", "D3DSCache.dll"];
const DXGI_LIBRARIES: &[&str] = &["dxgi.dll"];

pub fn is_in_linux_exclude_list(name: &str) -> bool {
    LINUX_EXCLUDE_LIST.contains(&name) || LINUX_LOCAL_EXCLUDE_LIST.contains(&name)
}

pub fn is_in_windows_exclude_list(name: &str) -> bool {
    WINDOWS_EXCLUDE_LIST.iter().any(|c| c.eq_ignore_ascii_case(name))
}

pub fn is_msvc_runtime(name: &str) -> bool {
    MSVC_RUNTIME_PREFIXES
        .iter()
        .any(|prefix| name.len() >= prefix.len() && name[..prefix.len()].eq_ignore_ascii_case(prefix))
}

pub fn is_windows_api_set(name: &str) -> bool {
    let lower_prefix = |p: &str| name.len() >= p.len() && name[..p.len()].eq_ignore_ascii_case(p);
    lower_prefix("api-") || lower_prefix("ext-")
}

pub fn is_direct3d_11(name: &str) -> bool {
    DIRECT3D_11_LIBRARIES.iter().any(|c| c.eq_ignore_ascii_case(name))
}

pub fn is_dxgi(name: &str) -> bool {
    DXGI_LIBRARIES.iter().any(|c| c.eq_ignore_ascii_case(name))
}

/// Composite decision and single choke-point for both finders: `platform`
/// decides which static list applies; `exclude_msvc_runtime` /
/// `exclude_windows_api_sets` gate the optional Windows-only exclusions (unused
/// on Linux).
pub fn should_distribute(
    name: &str,
    platform: &Platform,
    exclude_msvc_runtime: bool,
    exclude_windows_api_sets: bool,
) -> bool {
    if platform.is_windows() {
        if is_in_windows_exclude_list(name) {
            return false;
        }
        if exclude_msvc_runtime && is_msvc_runtime(name) {
            return false;
        }
        if exclude_windows_api_sets && is_windows_api_set(name) {
            return false;
        }
        if is_direct3d_11(name) || is_dxgi(name) {
            return false;
        }
        true
    } else {
        !is_in_linux_exclude_list(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{OperatingSystem, ProcessorIsa};

    fn linux() -> Platform {
        Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64)
    }

    fn windows() -> Platform {
        Platform::new(OperatingSystem::Windows, ProcessorIsa::X86_64)
    }

    #[test]
    fn libc_is_excluded_on_linux() {
        assert!(!should_distribute("libc.so.6", &linux(), true, true));
    }

    #[test]
    fn local_exclude_list_applies_on_linux() {
        assert!(!should_distribute("libudev.so.1", &linux(), true, true));
    }

    #[test]
    fn kernel32_is_excluded_case_insensitively() {
        assert!(!should_distribute("kernel32.dll", &windows(), true, true));
    }

    #[test]
    fn msvcp_excluded_only_when_configured() {
        assert!(should_distribute("msvcp140.dll", &windows(), false, true));
        assert!(!should_distribute("msvcp140.dll", &windows(), true, true));
    }

    #[test]
    fn dxgi_and_d3d11_always_excluded() {
        assert!(!should_distribute("dxgi.dll", &windows(), true, true));
        assert!(!should_distribute("d3d11.dll", &windows(), true, true));
    }

    #[test]
    fn ordinary_library_is_distributed() {
        assert!(should_distribute("libmyapp.so.1", &linux(), true, true));
        assert!(should_distribute("MyApp.dll", &windows(), true, true));
    }
}
