// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Xiaobaix-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Xiaobaix and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Frame-side bridge script and document wrapping.

/// Script injected into every embedded document before it goes live.
///
/// Gives frame content three things: `STBridge.sendMessageToST` for raw
/// outbound messages, `window.STscript(command)` returning a promise tied
/// to the host's reply, and `window.updateTemplateVariables(vars)` which
/// patches every `[data-xiaobaix-var]` span in place, fires a
/// `contentUpdated` event and reports the new height. The timeout constant
/// mirrors the host-side command timeout.
pub const BRIDGE_SCRIPT: &str = r#"
(function () {
    window.STBridge = {
        sendMessageToST: function (type, data) {
            try {
                window.parent.postMessage(Object.assign({
                    source: 'xiaobaix-iframe',
                    type: type
                }, data || {}), '*');
            } catch (e) {}
        },
        updateHeight: function () {
            try {
                var height = document.body.scrollHeight;
                if (height > 0) {
                    this.sendMessageToST('resize', { height: height });
                }
            } catch (e) {}
        }
    };

    window.STscript = function (command) {
        return new Promise(function (resolve, reject) {
            var id = Date.now().toString() + Math.random().toString(36).substring(2);
            window.STBridge.sendMessageToST('runCommand', { command: command, id: id });

            var listener = function (event) {
                var data = event.data;
                if (!data || data.source !== 'xiaobaix-host' || data.id !== id) return;
                if (data.type === 'commandResult') {
                    window.removeEventListener('message', listener);
                    resolve(data.result);
                } else if (data.type === 'commandError') {
                    window.removeEventListener('message', listener);
                    reject(new Error(data.error));
                }
            };

            window.addEventListener('message', listener);
            setTimeout(function () {
                window.removeEventListener('message', listener);
                reject(new Error('Command timeout'));
            }, 180000);
        });
    };

    window.updateTemplateVariables = function (variables) {
        Object.entries(variables).forEach(function (entry) {
            var elements = document.querySelectorAll('[data-xiaobaix-var="' + entry[0] + '"]');
            elements.forEach(function (el) {
                var value = entry[1];
                if (value === null || value === undefined) {
                    el.textContent = '';
                } else if (Array.isArray(value)) {
                    el.textContent = value.join(', ');
                } else if (typeof value === 'object') {
                    el.textContent = JSON.stringify(value);
                } else {
                    el.textContent = String(value);
                }
                el.style.display = '';
            });
        });
        window.dispatchEvent(new Event('contentUpdated'));
        window.STBridge.updateHeight();
    };

    window.addEventListener('message', function (event) {
        var data = event.data;
        if (!data || data.source !== 'xiaobaix-host') return;
        if (data.type === 'VARIABLE_UPDATE' && data.variables) {
            window.updateTemplateVariables(data.variables);
        }
    });

    function setup() {
        window.STBridge.updateHeight();
        window.addEventListener('resize', function () { window.STBridge.updateHeight(); });
        window.addEventListener('load', function () { window.STBridge.updateHeight(); });
        try {
            var observer = new MutationObserver(function () { window.STBridge.updateHeight(); });
            observer.observe(document.body, {
                attributes: true, childList: true, subtree: true, characterData: true
            });
        } catch (e) {}
        setInterval(function () { window.STBridge.updateHeight(); }, 1000);
    }

    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', setup);
    } else {
        setup();
    }
})();
"#;

/// Embeds the bridge script into a rendered document.
///
/// Complete documents get the script spliced in before `</body>` (or
/// `</html>` when there is no body tag); fragments are wrapped in a minimal
/// transparent-background skeleton first.
pub fn wrap_document(content: &str) -> String {
    let script = format!("<script type=\"text/javascript\">{BRIDGE_SCRIPT}</script>");

    if content.contains("</body>") {
        return content.replacen("</body>", &format!("{script}</body>"), 1);
    }
    if content.contains("</html>") {
        return content.replacen("</html>", &format!("{script}</html>"), 1);
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <style>body {{ margin: 0; padding: 10px; font-family: inherit; color: inherit; background: transparent; }}</style>\n\
         </head>\n<body>{content}{script}</body>\n</html>"
    )
}
