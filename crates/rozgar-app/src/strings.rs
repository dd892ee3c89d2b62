//! The built-in `(key, hi, en)` string table.

pub(crate) static STRINGS: &[(&str, &str, &str)] = &[
  // ── Header ──
  ("header.title", "BABADHAM-A2Z CONSULTANCY", "BABADHAM-A2Z CONSULTANCY"),
  ("header.home", "होम", "Home"),
  ("header.jobs", "नौकरियां", "Jobs"),
  ("header.companies", "कंपनियां", "Companies"),
  ("header.login", "लॉगिन", "Login"),
  ("header.logout", "लॉगआउट", "Logout"),
  ("header.profile", "प्रोफाइल सेटिंग्स", "Profile Settings"),
  ("header.admin", "एडमिन पैनल", "Admin Panel"),
  // ── Landing ──
  ("landing.hero.title", "अपना सपनों का करियर खोजें", "Find Your Dream Career"),
  (
    "landing.hero.subtitle",
    "आपका आशीर्वादित करियर यहाँ से शुरू होता है। हजारों नौकरियों में से अपने लिए सबसे अच्छी चुनें।",
    "Your blessed career journey starts here. Choose the best from thousands of opportunities.",
  ),
  ("landing.search.job", "नौकरी का शीर्षक...", "Job title..."),
  ("landing.search.location", "स्थान", "Location"),
  ("landing.search.button", "नौकरी खोजें", "Search Jobs"),
  ("landing.stats.jobs", "सक्रिय नौकरियां", "Active Jobs"),
  // ── Auth ──
  ("auth.welcome", "स्वागत है", "Welcome"),
  ("auth.create", "नया खाता बनाएं", "Create New Account"),
  ("auth.signin.subtitle", "अपने खाते में साइन इन करें", "Sign in to your account"),
  ("auth.signup.subtitle", "BABADHAM-A2Z में शामिल हों", "Join BABADHAM-A2Z"),
  ("auth.email", "ईमेल", "Email"),
  ("auth.phone", "फोन", "Phone"),
  ("auth.who.are.you", "आप कौन हैं?", "Who are you?"),
  ("auth.jobseeker", "नौकरी खोजने वाले", "Job Seeker"),
  ("auth.employer", "नियोक्ता", "Employer"),
  ("auth.admin", "एडमिन", "Admin"),
  ("auth.fullname", "पूरा नाम", "Full Name"),
  ("auth.password", "पासवर्ड", "Password"),
  ("auth.company", "कंपनी का नाम", "Company Name"),
  ("auth.location", "स्थान", "Location"),
  ("auth.phone.number", "फोन नंबर", "Phone Number"),
  ("auth.otp.code", "OTP कोड", "OTP Code"),
  ("auth.signin", "साइन इन करें", "Sign In"),
  ("auth.signup", "खाता बनाएं", "Create Account"),
  ("auth.otp.send", "OTP भेजें", "Send OTP"),
  ("auth.otp.verify", "OTP वेरिफाई करें", "Verify OTP"),
  // ── Dashboards ──
  ("dashboard.welcome", "नमस्ते", "Welcome"),
  ("dashboard.loading", "लोड हो रहा है...", "Loading..."),
  ("jobseeker.subtitle", "आपके सपनों की नौकरी खोजें", "Find your dream job"),
  ("jobseeker.browse", "नौकरी खोजें", "Browse Jobs"),
  ("jobseeker.applications", "मेरे आवेदन", "My Applications"),
  ("jobseeker.profile", "प्रोफाइल", "Profile"),
  ("employer.subtitle", "अपनी कंपनी के लिए बेहतरीन प्रतिभा खोजें", "Find excellent talent for your company"),
  ("employer.jobs", "मेरी नौकरियां", "My Jobs"),
  ("employer.post.job", "नई नौकरी पोस्ट करें", "Post New Job"),
  ("employer.applicants", "आवेदक", "Applicants"),
  ("admin.title", "BABADHAM-A2Z ADMIN", "BABADHAM-A2Z ADMIN"),
  ("admin.subtitle", "CONSULTANCY MANAGEMENT PORTAL", "CONSULTANCY MANAGEMENT PORTAL"),
  ("admin.jobs", "Jobs Management", "Jobs Management"),
  ("admin.applications", "Applications", "Applications"),
  // ── Common ──
  ("common.apply", "आवेदन करें", "Apply"),
  ("common.view", "विवरण", "View Details"),
  ("common.edit", "संपादित करें", "Edit"),
  ("common.delete", "डिलीट करें", "Delete"),
  ("common.save", "सेव करें", "Save"),
  ("common.cancel", "रद्द करें", "Cancel"),
  ("common.search", "खोजें", "Search"),
  ("common.filter", "फिल्टर", "Filter"),
  ("common.loading", "लोड हो रहा है...", "Loading..."),
  ("common.error", "कुछ गलत हुआ है", "Something went wrong"),
  ("common.success", "सफल", "Success"),
  ("common.empty", "कुछ नहीं मिला", "Nothing found"),
  ("common.offline", "ऑफ़लाइन मोड", "Offline mode"),
  // ── Table columns ──
  ("column.title", "शीर्षक", "Title"),
  ("column.company", "कंपनी", "Company"),
  ("column.location", "स्थान", "Location"),
  ("column.salary", "वेतन", "Salary"),
  ("column.type", "प्रकार", "Type"),
  ("column.status", "स्थिति", "Status"),
  ("column.applicant", "आवेदक", "Applicant"),
  ("column.applied", "आवेदन तिथि", "Applied"),
  ("column.views", "व्यूज़", "Views"),
  // ── Key hints ──
  (
    "hint.landing",
    "Tab: अगला फ़ील्ड  Enter: भेजें  F3: OTP/ईमेल  F4: भूमिका  F2: English  Esc: बाहर",
    "Tab: next field  Enter: submit  F3: OTP/email  F4: role  F2: हिंदी  Esc: quit",
  ),
  (
    "hint.jobseeker",
    "↑↓: चुनें  a: आवेदन  /: खोज  Tab: टैब  F2: English  F10: लॉगआउट  Esc: बाहर",
    "↑↓: select  a: apply  /: search  Tab: switch tab  F2: हिंदी  F10: logout  Esc: quit",
  ),
  (
    "hint.employer",
    "↑↓: चुनें  s: स्थिति  d: डिलीट  Tab: टैब  F2: English  F10: लॉगआउट  Esc: बाहर",
    "↑↓: select  s: status  d: delete  Tab: switch tab  F2: हिंदी  F10: logout  Esc: quit",
  ),
  (
    "hint.admin",
    "↑↓: चुनें  s: स्थिति  d: डिलीट  Tab: टैब  F2: English  F10: लॉगआउट  Esc: बाहर",
    "↑↓: select  s: status  d: delete  Tab: switch tab  F2: हिंदी  F10: logout  Esc: quit",
  ),
  // ── Toasts: session ──
  ("toast.signup.success", "खाता सफलतापूर्वक बनाया गया! कृपया अपना ईमेल चेक करें।", "Account created! Please check your email."),
  ("toast.signup.failed", "खाता बनाने में त्रुटि", "Error creating account"),
  ("toast.signup.email_taken", "इस ईमेल से पहले से खाता मौजूद है", "An account already exists for this email"),
  ("toast.signin.success", "सफलतापूर्वक लॉगिन हो गए!", "Signed in successfully!"),
  ("toast.signin.invalid", "गलत ईमेल या पासवर्ड", "Wrong email or password"),
  ("toast.signin.failed", "लॉगिन में त्रुटि", "Error signing in"),
  ("toast.signin.wrong_role", "यह खाता इस भूमिका के लिए पंजीकृत नहीं है", "This account is not registered for that role"),
  ("toast.otp.sent", "OTP आपके फोन पर भेजा गया है", "OTP sent to your phone"),
  ("toast.otp.send_failed", "OTP भेजने में त्रुटि", "Error sending OTP"),
  ("toast.otp.verified", "सफलतापूर्वक वेरिफाई हो गया!", "Verified successfully!"),
  ("toast.otp.invalid", "गलत OTP", "Wrong OTP"),
  ("toast.otp.verify_failed", "OTP वेरिफिकेशन में त्रुटि", "Error verifying OTP"),
  ("toast.signout.success", "सफलतापूर्वक लॉगआउट हो गए!", "Signed out successfully!"),
  ("toast.signout.failed", "लॉगआउट में त्रुटि", "Error signing out"),
  ("toast.reset.sent", "पासवर्ड रीसेट लिंक आपके ईमेल पर भेजा गया है", "Password reset link sent to your email"),
  ("toast.reset.failed", "पासवर्ड रीसेट में त्रुटि", "Error resetting password"),
  ("toast.profile.updated", "प्रोफाइल सफलतापूर्वक अपडेट हो गया!", "Profile updated successfully!"),
  ("toast.profile.update_failed", "प्रोफाइल अपडेट में त्रुटि", "Error updating profile"),
  // ── Toasts: jobs ──
  ("toast.jobs.load_failed", "नौकरियां लोड करने में त्रुटि", "Error loading jobs"),
  ("toast.job.created", "नौकरी सफलतापूर्वक पोस्ट की गई!", "Job posted successfully!"),
  ("toast.job.create_failed", "नौकरी पोस्ट करने में त्रुटि", "Error posting job"),
  ("toast.job.updated", "नौकरी सफलतापूर्वक अपडेट हो गई!", "Job updated successfully!"),
  ("toast.job.update_failed", "नौकरी अपडेट करने में त्रुटि", "Error updating job"),
  ("toast.job.deleted", "नौकरी सफलतापूर्वक डिलीट हो गई!", "Job deleted successfully!"),
  ("toast.job.delete_failed", "नौकरी डिलीट करने में त्रुटि", "Error deleting job"),
  // ── Toasts: applications ──
  ("toast.applications.load_failed", "आवेदन लोड करने में त्रुटि", "Error loading applications"),
  ("toast.application.created", "आवेदन सफलतापूर्वक जमा किया गया!", "Application submitted successfully!"),
  ("toast.application.duplicate", "आपने पहले से ही इस नौकरी के लिए आवेदन किया है!", "You have already applied for this job!"),
  ("toast.application.create_failed", "आवेदन जमा करने में त्रुटि", "Error submitting application"),
  ("toast.application.updated", "आवेदन स्थिति सफलतापूर्वक अपडेट हो गई!", "Application status updated successfully!"),
  ("toast.application.update_failed", "आवेदन स्थिति अपडेट करने में त्रुटि", "Error updating application status"),
  ("toast.application.deleted", "आवेदन सफलतापूर्वक डिलीट हो गया!", "Application deleted successfully!"),
  ("toast.application.delete_failed", "आवेदन डिलीट करने में त्रुटि", "Error deleting application"),
];

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::STRINGS;

  #[test]
  fn keys_are_unique_and_both_languages_present() {
    let mut seen = HashSet::new();
    for (key, hi, en) in STRINGS {
      assert!(seen.insert(*key), "duplicate key {key}");
      assert!(!hi.is_empty() && !en.is_empty(), "empty text for {key}");
    }
  }
}
